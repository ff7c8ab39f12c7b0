//! Domain primitives, validation rules and the account lifecycle service.
//!
//! Purpose: define strongly typed account entities and the use-cases that
//! operate on them, independent of HTTP and storage concerns.
//!
//! Public surface:
//! - Account, AccountView, AccountPatch, RegistrationCandidate: the account
//!   data model and its inbound shapes.
//! - FieldViolations, ViolationKind: typed validation failures.
//! - AccountService: implements the driving ports in [`ports`].
//! - Error, ErrorCode: transport-agnostic error payload.

pub mod account;
pub mod account_error;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod validation;

pub use self::account::{
    Account, AccountId, AccountPatch, AccountView, InvalidAccountId, NewAccount, PasswordHash,
    RegistrationCandidate, UpdateOutcome,
};
pub use self::account_error::{AccountError, INVALID_CREDENTIALS_MESSAGE};
pub use self::account_service::AccountService;
pub use self::auth::LoginCredentials;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::validation::{
    AccountField, AgeThreshold, FieldViolations, MINIMUM_AGE_YEARS, Violation, ViolationKind,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use accounts::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
