//! Account data model.
//!
//! [`Account`] is the stored record. It deliberately does not implement
//! `Serialize`; outward representations go through [`AccountView`], which has
//! no password hash field.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Error returned when an account identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("account id must be a valid UUID")]
pub struct InvalidAccountId;

/// Server-assigned account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random [`AccountId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an identifier from its textual form.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::AccountId;
    ///
    /// assert!(AccountId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
    /// assert!(AccountId::parse("42").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InvalidAccountId> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| InvalidAccountId)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Encoded one-way password hash.
///
/// The `Debug` output is redacted so the hash never reaches logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a credential hasher.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Registered account.
///
/// ## Invariants
/// - `id` is assigned by the store, never by the client.
/// - `email` is unique across live accounts and never changes.
/// - `password_hash` never equals the plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    full_name: String,
    date_of_birth: i64,
    phone_number: String,
    email: String,
    password_hash: PasswordHash,
}

impl Account {
    /// Rebuild an account from stored components.
    pub fn from_parts(id: AccountId, details: NewAccount) -> Self {
        let NewAccount {
            full_name,
            date_of_birth,
            phone_number,
            email,
            password_hash,
        } = details;
        Self {
            id,
            full_name,
            date_of_birth,
            phone_number,
            email,
            password_hash,
        }
    }

    /// Stable account identifier.
    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Birth date as a Unix timestamp in seconds.
    pub fn date_of_birth(&self) -> i64 {
        self.date_of_birth
    }

    pub fn phone_number(&self) -> &str {
        self.phone_number.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Merge the present fields of `patch`; absent fields keep their value.
    pub fn apply_patch(&mut self, patch: &AccountPatch) {
        if let Some(full_name) = patch.full_name() {
            full_name.clone_into(&mut self.full_name);
        }
        if let Some(date_of_birth) = patch.date_of_birth() {
            self.date_of_birth = date_of_birth;
        }
        if let Some(phone_number) = patch.phone_number() {
            phone_number.clone_into(&mut self.phone_number);
        }
    }

    /// Outward projection without the password hash.
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            full_name: self.full_name.clone(),
            date_of_birth: self.date_of_birth,
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
        }
    }
}

/// Validated, hashed account details awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub full_name: String,
    pub date_of_birth: i64,
    pub phone_number: String,
    pub email: String,
    pub password_hash: PasswordHash,
}

/// Public representation of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub full_name: String,
    pub date_of_birth: i64,
    pub phone_number: String,
    pub email: String,
}

/// Unvalidated registration data.
///
/// The plaintext password is zeroised on drop and redacted from `Debug`.
#[derive(Clone)]
pub struct RegistrationCandidate {
    full_name: String,
    date_of_birth: i64,
    phone_number: String,
    email: String,
    password: Zeroizing<String>,
}

impl RegistrationCandidate {
    /// Capture raw registration inputs. Email surrounding whitespace is trimmed.
    pub fn new(
        full_name: impl Into<String>,
        date_of_birth: i64,
        phone_number: impl Into<String>,
        email: impl AsRef<str>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            date_of_birth,
            phone_number: phone_number.into(),
            email: email.as_ref().trim().to_owned(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    pub fn date_of_birth(&self) -> i64 {
        self.date_of_birth
    }

    pub fn phone_number(&self) -> &str {
        self.phone_number.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Replace the plaintext password with its hash.
    pub fn into_new_account(self, password_hash: PasswordHash) -> NewAccount {
        NewAccount {
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            phone_number: self.phone_number,
            email: self.email,
            password_hash,
        }
    }
}

impl fmt::Debug for RegistrationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationCandidate")
            .field("full_name", &self.full_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Partial update of the mutable profile fields.
///
/// Empty strings and a zero birth date are treated as absent. Email and
/// password cannot be changed through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    full_name: Option<String>,
    date_of_birth: Option<i64>,
    phone_number: Option<String>,
}

impl AccountPatch {
    /// Build a patch, normalising empty and zero values to absent.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::AccountPatch;
    ///
    /// let patch = AccountPatch::new(Some(String::new()), Some(0), None);
    /// assert!(patch.is_empty());
    /// ```
    pub fn new(
        full_name: Option<String>,
        date_of_birth: Option<i64>,
        phone_number: Option<String>,
    ) -> Self {
        Self {
            full_name: full_name.filter(|value| !value.is_empty()),
            date_of_birth: date_of_birth.filter(|value| *value != 0),
            phone_number: phone_number.filter(|value| !value.is_empty()),
        }
    }

    /// Whether the patch carries no change.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.date_of_birth.is_none() && self.phone_number.is_none()
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<i64> {
        self.date_of_birth
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }
}

/// Result of applying a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one field changed and the record was persisted.
    Updated(Account),
    /// The patch was empty; the record is returned untouched.
    Unchanged(Account),
}

impl UpdateOutcome {
    /// Account state after the operation.
    pub fn account(&self) -> &Account {
        match self {
            Self::Updated(account) | Self::Unchanged(account) => account,
        }
    }
}
