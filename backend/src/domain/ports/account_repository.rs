//! Port for account record storage.
//!
//! Both the durable PostgreSQL adapter and the in-memory adapter implement
//! [`AccountRepository`] with identical semantics, so the account service can
//! run unchanged against either.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, AccountPatch, NewAccount};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Another live account already uses the email.
        DuplicateEmail => "account email already registered",
        /// The identifier does not resolve to a live account.
        NotFound => "account not found",
    }
}

/// Storage contract for account records.
///
/// Only live accounts are visible: once deleted, a record never appears in
/// lookups or listings again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Assign an identifier and persist the record.
    ///
    /// The email uniqueness check and the write happen atomically; a
    /// conflicting live email yields [`AccountRepositoryError::DuplicateEmail`].
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError>;

    /// Fetch a live account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch a live account by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError>;

    /// List every live account.
    ///
    /// The in-memory adapter returns insertion order; the durable adapter
    /// orders by creation time.
    async fn list_all(&self) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Number of live accounts.
    async fn count(&self) -> Result<u64, AccountRepositoryError>;

    /// Write the present fields of `patch` to a live account and return the
    /// stored result.
    ///
    /// Absent fields keep whatever value is stored at write time, so
    /// concurrent patches touching different fields never undo each other.
    async fn apply_patch(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<Account, AccountRepositoryError>;

    /// Remove an account from all future lookups.
    async fn delete(&self, id: &AccountId) -> Result<(), AccountRepositoryError>;
}
