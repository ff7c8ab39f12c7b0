//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Each operation is a single SQL statement, so every write is atomic. The
//! partial unique index on live emails is the authoritative uniqueness guard;
//! its violation is reported as [`AccountRepositoryError::DuplicateEmail`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, AccountPatch, NewAccount, PasswordHash};

use super::models::{AccountPatchChangeset, AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel-backed implementation of the `AccountRepository` port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AccountRepositoryError::duplicate_email()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AccountRepositoryError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => AccountRepositoryError::query("database query error"),
        _ => AccountRepositoryError::query("database error"),
    }
}

fn row_to_account(row: AccountRow) -> Account {
    Account::from_parts(
        AccountId::from_uuid(row.id),
        NewAccount {
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            phone_number: row.phone_number,
            email: row.email,
            password_hash: PasswordHash::new(row.password_hash),
        },
    )
}

fn patch_changeset(patch: &AccountPatch, now: DateTime<Utc>) -> AccountPatchChangeset<'_> {
    AccountPatchChangeset {
        full_name: patch.full_name(),
        date_of_birth: patch.date_of_birth(),
        phone_number: patch.phone_number(),
        updated_at: now,
    }
}

fn not_found_when_untouched(rows: usize) -> Result<(), AccountRepositoryError> {
    if rows == 0 {
        Err(AccountRepositoryError::not_found())
    } else {
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewAccountRow {
            id: Uuid::new_v4(),
            full_name: &account.full_name,
            date_of_birth: account.date_of_birth,
            phone_number: &account.phone_number,
            email: &account.email,
            password_hash: account.password_hash.as_str(),
        };

        diesel::insert_into(accounts::table)
            .values(&row)
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_account)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .filter(accounts::deleted_at.is_null())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_account))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = accounts::table
            .filter(accounts::email.eq(email))
            .filter(accounts::deleted_at.is_null())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_account))
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AccountRow> = accounts::table
            .filter(accounts::deleted_at.is_null())
            .order((accounts::created_at.asc(), accounts::id.asc()))
            .select(AccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_account).collect())
    }

    async fn count(&self) -> Result<u64, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let live: i64 = accounts::table
            .filter(accounts::deleted_at.is_null())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(live).unwrap_or_default())
    }

    async fn apply_patch(
        &self,
        id: &AccountId,
        patch: &AccountPatch,
    ) -> Result<Account, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = patch_changeset(patch, Utc::now());

        let row: Option<AccountRow> = diesel::update(
            accounts::table
                .filter(accounts::id.eq(id.as_uuid()))
                .filter(accounts::deleted_at.is_null()),
        )
        .set(&changes)
        .returning(AccountRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_account)
            .ok_or_else(AccountRepositoryError::not_found)
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let now = Utc::now();
        let rows = diesel::update(
            accounts::table
                .filter(accounts::id.eq(id.as_uuid()))
                .filter(accounts::deleted_at.is_null()),
        )
        .set((
            accounts::deleted_at.eq(Some(now)),
            accounts::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        not_found_when_untouched(rows)
    }
}
