//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed account repository using Diesel ORM
//! - **memory**: ephemeral in-process account repository
//! - **hashing**: bcrypt credential hasher
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod hashing;
pub mod memory;
pub mod persistence;
