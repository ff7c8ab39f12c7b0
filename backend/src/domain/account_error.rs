//! Failure taxonomy for the account service.
//!
//! [`AccountError`] keeps each failure distinct so logs and tests can tell
//! them apart. Conversion into the outward [`Error`] payload collapses the
//! three login denials into one response so callers cannot tell which
//! emails are registered.

use super::error::Error;
use super::ports::{AccountRepositoryError, CredentialHasherError};
use super::validation::FieldViolations;

/// Message returned for every denied login.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";

/// Typed failure returned by account use-cases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// One or more fields failed validation.
    #[error("{0}")]
    ValidationFailed(FieldViolations),
    /// A live account already uses the email.
    #[error("an account with this email already exists")]
    DuplicateEmail,
    /// No live account has the requested identifier.
    #[error("account not found")]
    NotFound,
    /// No live account matches the submitted email.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The account exists but the password did not verify.
    #[error("incorrect password")]
    IncorrectPassword,
    /// The store holds no live accounts at all.
    #[error("no accounts are registered")]
    NoAccountsAvailable,
    /// The store could not be reached.
    #[error("account storage unavailable: {cause}")]
    StorageUnavailable { cause: String },
    /// The store failed while executing an operation.
    #[error("account storage error: {cause}")]
    StorageError { cause: String },
    /// The password could not be hashed.
    #[error("password hashing failed: {cause}")]
    HashingFailed { cause: String },
    /// The stored credential for an account could not be parsed.
    #[error("stored credential is corrupt")]
    CorruptCredential,
}

impl AccountError {
    /// Whether this failure denies a login attempt.
    pub fn is_login_denial(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::IncorrectPassword | Self::NoAccountsAvailable
        )
    }
}

impl From<FieldViolations> for AccountError {
    fn from(violations: FieldViolations) -> Self {
        Self::ValidationFailed(violations)
    }
}

impl From<AccountRepositoryError> for AccountError {
    fn from(error: AccountRepositoryError) -> Self {
        match error {
            AccountRepositoryError::Connection { message } => {
                Self::StorageUnavailable { cause: message }
            }
            AccountRepositoryError::Query { message } => Self::StorageError { cause: message },
            AccountRepositoryError::DuplicateEmail => Self::DuplicateEmail,
            AccountRepositoryError::NotFound => Self::NotFound,
        }
    }
}

impl From<CredentialHasherError> for AccountError {
    fn from(error: CredentialHasherError) -> Self {
        match error {
            CredentialHasherError::Hash { message } => Self::HashingFailed { cause: message },
            CredentialHasherError::CorruptHash => Self::CorruptCredential,
        }
    }
}

impl From<AccountError> for Error {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::ValidationFailed(violations) => {
                Error::invalid_request(violations.summary()).with_details(violations.to_details())
            }
            AccountError::DuplicateEmail => Error::conflict(error.to_string()),
            AccountError::NotFound => Error::not_found(error.to_string()),
            AccountError::InvalidCredentials
            | AccountError::IncorrectPassword
            | AccountError::NoAccountsAvailable => Error::unauthorized(INVALID_CREDENTIALS_MESSAGE),
            AccountError::StorageUnavailable { .. } => Error::service_unavailable(error.to_string()),
            AccountError::StorageError { .. }
            | AccountError::HashingFailed { .. }
            | AccountError::CorruptCredential => Error::internal(error.to_string()),
        }
    }
}
