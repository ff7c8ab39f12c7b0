//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// Rows are soft deleted by setting `deleted_at`; a partial unique index
    /// on `email` covers live rows only.
    accounts (id) {
        /// Primary key: server-assigned UUID v4.
        id -> Uuid,
        full_name -> Varchar,
        /// Unix timestamp in seconds.
        date_of_birth -> Int8,
        phone_number -> Varchar,
        email -> Varchar,
        /// bcrypt modular crypt string.
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// Set when the account is removed.
        deleted_at -> Nullable<Timestamptz>,
    }
}
