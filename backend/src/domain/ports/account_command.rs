//! Driving port for account mutations.
//!
//! Inbound adapters call [`AccountCommand`] to register, update and remove
//! accounts without importing the backing store.

use async_trait::async_trait;

use crate::domain::{
    Account, AccountError, AccountId, AccountPatch, RegistrationCandidate, UpdateOutcome,
};

/// Domain use-case port for account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Validate, hash and store a new account.
    async fn register(&self, candidate: RegistrationCandidate) -> Result<Account, AccountError>;

    /// Merge a partial update into an existing account.
    ///
    /// An empty patch yields [`UpdateOutcome::Unchanged`] without touching the
    /// store.
    async fn apply_update(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<UpdateOutcome, AccountError>;

    /// Remove an account.
    async fn remove(&self, id: &AccountId) -> Result<(), AccountError>;
}
