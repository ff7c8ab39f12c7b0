//! Account lifecycle service.
//!
//! [`AccountService`] orchestrates validation, password hashing and the
//! account repository to implement the account driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, AccountQuery, AccountRepository, CredentialHasher, CredentialHasherError,
    LoginService,
};
use crate::domain::validation::{AgeThreshold, validate_candidate, validate_patch};
use crate::domain::{
    Account, AccountError, AccountId, AccountPatch, LoginCredentials, RegistrationCandidate,
    UpdateOutcome,
};

/// Account service implementing the command, query and login ports.
#[derive(Clone)]
pub struct AccountService<R, H> {
    repository: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> AccountService<R, H> {
    /// Create a new service over the given repository, hasher and clock.
    pub fn new(repository: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            hasher,
            clock,
        }
    }

    fn age_threshold(&self) -> AgeThreshold {
        AgeThreshold::at(self.clock.utc())
    }
}

impl<R, H> AccountService<R, H>
where
    R: AccountRepository,
    H: CredentialHasher + 'static,
{
    /// Run a hasher call on the blocking pool so bcrypt does not stall the
    /// async worker.
    async fn with_hasher<T, F>(&self, job: F) -> Result<T, CredentialHasherError>
    where
        T: Send + 'static,
        F: FnOnce(&H) -> Result<T, CredentialHasherError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || job(hasher.as_ref()))
            .await
            .map_err(|error| CredentialHasherError::hash(format!("hashing task failed: {error}")))?
    }

    async fn require_live(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            debug!(account_id = %id, "account lookup missed");
            AccountError::NotFound
        })
    }
}

#[async_trait]
impl<R, H> AccountCommand for AccountService<R, H>
where
    R: AccountRepository,
    H: CredentialHasher + 'static,
{
    async fn register(&self, candidate: RegistrationCandidate) -> Result<Account, AccountError> {
        validate_candidate(&candidate, self.age_threshold())?;

        // Advisory only: the repository insert is the authoritative guard.
        if self
            .repository
            .find_by_email(candidate.email())
            .await?
            .is_some()
        {
            debug!("registration rejected: email already registered");
            return Err(AccountError::DuplicateEmail);
        }

        let password = Zeroizing::new(candidate.password().to_owned());
        let password_hash = self
            .with_hasher(move |hasher| hasher.hash(&password))
            .await?;
        let account = self
            .repository
            .insert(&candidate.into_new_account(password_hash))
            .await?;

        info!(account_id = %account.id(), "account registered");
        Ok(account)
    }

    async fn apply_update(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<UpdateOutcome, AccountError> {
        let current = self.require_live(id).await?;
        if patch.is_empty() {
            debug!(account_id = %id, "empty patch; account left unchanged");
            return Ok(UpdateOutcome::Unchanged(current));
        }

        validate_patch(patch, self.age_threshold())?;
        let account = self.repository.apply_patch(id, patch).await?;

        info!(account_id = %id, "account updated");
        Ok(UpdateOutcome::Updated(account))
    }

    async fn remove(&self, id: &AccountId) -> Result<(), AccountError> {
        self.require_live(id).await?;
        self.repository.delete(id).await?;
        info!(account_id = %id, "account removed");
        Ok(())
    }
}

#[async_trait]
impl<R, H> AccountQuery for AccountService<R, H>
where
    R: AccountRepository,
    H: CredentialHasher + 'static,
{
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.repository.list_all().await?)
    }
}

#[async_trait]
impl<R, H> LoginService for AccountService<R, H>
where
    R: AccountRepository,
    H: CredentialHasher + 'static,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AccountId, AccountError> {
        let Some(account) = self.repository.find_by_email(credentials.email()).await? else {
            let error = if self.repository.count().await? == 0 {
                AccountError::NoAccountsAvailable
            } else {
                AccountError::InvalidCredentials
            };
            debug!(reason = %error, "login denied");
            return Err(error);
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        let stored = account.password_hash().clone();
        let verified = self
            .with_hasher(move |hasher| hasher.verify(&password, &stored))
            .await
            .inspect_err(|error| {
                if matches!(error, CredentialHasherError::CorruptHash) {
                    warn!(account_id = %account.id(), "stored password hash is corrupt");
                }
            })?;

        if verified {
            debug!(account_id = %account.id(), "login accepted");
            Ok(account.id())
        } else {
            debug!(account_id = %account.id(), "login denied: incorrect password");
            Err(AccountError::IncorrectPassword)
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
