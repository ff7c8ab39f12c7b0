//! Account management service: validation, credential hashing, storage
//! adapters, and the REST surface.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use middleware::RequestLog;
