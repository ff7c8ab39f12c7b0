//! Internal Diesel row structs for the accounts table.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::accounts;

/// Live columns read back from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub full_name: String,
    pub date_of_birth: i64,
    pub phone_number: String,
    pub email: String,
    pub password_hash: String,
}

/// Insertable struct for creating account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub full_name: &'a str,
    pub date_of_birth: i64,
    pub phone_number: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Changeset for the mutable profile columns.
///
/// `None` fields are left out of the `SET` clause, so a column not named by
/// the patch keeps its stored value.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = accounts)]
pub(crate) struct AccountPatchChangeset<'a> {
    pub full_name: Option<&'a str>,
    pub date_of_birth: Option<i64>,
    pub phone_number: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
