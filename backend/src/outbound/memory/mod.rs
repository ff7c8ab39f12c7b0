//! Ephemeral in-process account store.
//!
//! Records live in a lock-guarded map keyed by an insertion sequence, with
//! secondary indexes for identifier and email lookups. Every mutation takes
//! the write lock for its whole read-modify-write, so the email uniqueness
//! check and the insert cannot interleave with another registration. Guards
//! are never held across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, AccountPatch, NewAccount};

#[derive(Debug, Default)]
struct Store {
    next_sequence: u64,
    by_sequence: BTreeMap<u64, Account>,
    sequence_by_id: HashMap<AccountId, u64>,
    id_by_email: HashMap<String, AccountId>,
}

impl Store {
    fn get(&self, id: &AccountId) -> Option<&Account> {
        self.sequence_by_id
            .get(id)
            .and_then(|sequence| self.by_sequence.get(sequence))
    }

    fn get_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        let sequence = self.sequence_by_id.get(id)?;
        self.by_sequence.get_mut(sequence)
    }
}

/// [`AccountRepository`] backed by process memory.
///
/// Listing returns accounts in insertion order. Contents are lost when the
/// process exits.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    store: RwLock<Store>,
}

impl InMemoryAccountRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, AccountRepositoryError> {
        self.store.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, AccountRepositoryError> {
        self.store.write().map_err(poisoned)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> AccountRepositoryError {
    AccountRepositoryError::query("in-memory account store lock poisoned")
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut store = self.write()?;
        if store.id_by_email.contains_key(account.email.as_str()) {
            return Err(AccountRepositoryError::duplicate_email());
        }

        let id = AccountId::random();
        let record = Account::from_parts(id, account.clone());
        let sequence = store.next_sequence;
        store.next_sequence += 1;
        store.by_sequence.insert(sequence, record.clone());
        store.sequence_by_id.insert(id, sequence);
        store.id_by_email.insert(account.email.clone(), id);
        Ok(record)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError> {
        let store = self.read()?;
        Ok(store
            .id_by_email
            .get(email)
            .and_then(|id| store.get(id))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountRepositoryError> {
        Ok(self.read()?.by_sequence.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, AccountRepositoryError> {
        let live = self.read()?.by_sequence.len();
        Ok(u64::try_from(live).unwrap_or(u64::MAX))
    }

    async fn apply_patch(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<Account, AccountRepositoryError> {
        let mut store = self.write()?;
        let stored = store
            .get_mut(id)
            .ok_or_else(AccountRepositoryError::not_found)?;
        stored.apply_patch(patch);
        Ok(stored.clone())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountRepositoryError> {
        let mut store = self.write()?;
        let sequence = store
            .sequence_by_id
            .remove(id)
            .ok_or_else(AccountRepositoryError::not_found)?;
        if let Some(removed) = store.by_sequence.remove(&sequence) {
            store.id_by_email.remove(removed.email());
        }
        Ok(())
    }
}
