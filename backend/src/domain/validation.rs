//! Field-level validation rules for account candidates, patches and logins.
//!
//! Every check returns a typed [`ViolationKind`]. Registration and login
//! collect all violations into [`FieldViolations`]; partial updates stop at the
//! first invalid field.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value, json};

use super::account::{AccountPatch, RegistrationCandidate};

/// Minimum full name length in characters.
pub const FULL_NAME_MIN: usize = 5;
/// Maximum full name length in characters.
pub const FULL_NAME_MAX: usize = 30;
/// Minimum password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length in characters.
pub const PASSWORD_MAX: usize = 30;
/// Maximum password length in UTF-8 bytes; bcrypt ignores anything beyond.
pub const PASSWORD_MAX_BYTES: usize = 72;
/// Minimum age, in years, of an account holder.
pub const MINIMUM_AGE_YEARS: i64 = 16;

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;
const EMAIL_MAX: usize = 254;

static PHONE_NUMBER_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn phone_number_regex() -> &'static Regex {
    PHONE_NUMBER_RE.get_or_init(|| {
        Regex::new(r"^\+[1-9][0-9]{0,14}$")
            .unwrap_or_else(|error| panic!("phone number regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = concat!(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
            r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
            r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        );
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Account fields subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountField {
    FullName,
    DateOfBirth,
    PhoneNumber,
    Email,
    Password,
}

impl AccountField {
    /// Wire name of the field, matching the JSON payload keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::DateOfBirth => "date_of_birth",
            Self::PhoneNumber => "phone_number",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Length in characters fell outside `min..=max`.
    LengthOutOfRange { min: usize, max: usize },
    /// A mandatory value was absent.
    RequiredFieldMissing,
    /// The birth date describes someone younger than `years`.
    BelowMinimumAge { years: i64 },
    /// The value does not follow the expected grammar.
    InvalidFormat,
    /// Encoded length in UTF-8 bytes exceeded `max_bytes`.
    ByteLengthExceeded { max_bytes: usize },
}

impl ViolationKind {
    /// Stable machine-readable code for the violation.
    pub fn code(self) -> &'static str {
        match self {
            Self::LengthOutOfRange { .. } | Self::ByteLengthExceeded { .. } => {
                "length_out_of_range"
            }
            Self::RequiredFieldMissing => "required_field_missing",
            Self::BelowMinimumAge { .. } => "below_minimum_age",
            Self::InvalidFormat => "invalid_format",
        }
    }
}

/// A field paired with the reason it was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    field: AccountField,
    kind: ViolationKind,
}

impl Violation {
    /// Build a violation for `field`.
    pub fn new(field: AccountField, kind: ViolationKind) -> Self {
        Self { field, kind }
    }

    /// Field that failed validation.
    pub fn field(&self) -> AccountField {
        self.field
    }

    /// Reason the field was rejected.
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Human-readable message for this field and reason.
    pub fn message(&self) -> String {
        match (self.field, self.kind) {
            (field, ViolationKind::LengthOutOfRange { min, max }) => {
                let label = match field {
                    AccountField::FullName => "full name",
                    AccountField::Password => "password",
                    other => other.as_str(),
                };
                format!("{label} must be between {min} and {max} characters")
            }
            (field, ViolationKind::ByteLengthExceeded { max_bytes }) => {
                format!("{field} must be at most {max_bytes} bytes when UTF-8 encoded")
            }
            (field, ViolationKind::RequiredFieldMissing) => {
                format!("{field} is required")
            }
            (_, ViolationKind::BelowMinimumAge { years }) => {
                format!("account holder must be at least {years} years old")
            }
            (AccountField::PhoneNumber, ViolationKind::InvalidFormat) => {
                "phone number must be in E.164 format, including the country code (e.g. +234)"
                    .to_owned()
            }
            (AccountField::Email, ViolationKind::InvalidFormat) => {
                "email address is invalid".to_owned()
            }
            (field, ViolationKind::InvalidFormat) => format!("{field} has an invalid format"),
        }
    }
}

/// Aggregate of every violation found by a validation call.
///
/// ## Invariants
/// - At most one violation is recorded per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldViolations(Vec<Violation>);

impl FieldViolations {
    /// Start an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate holding one violation.
    pub fn single(field: AccountField, kind: ViolationKind) -> Self {
        Self(vec![Violation::new(field, kind)])
    }

    /// Record the outcome of a field check, keeping the first failure per field.
    pub fn record(&mut self, field: AccountField, outcome: Result<(), ViolationKind>) {
        let Err(kind) = outcome else {
            return;
        };
        if self.get(field).is_none() {
            self.0.push(Violation::new(field, kind));
        }
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Violation recorded for `field`, if any.
    pub fn get(&self, field: AccountField) -> Option<ViolationKind> {
        self.0
            .iter()
            .find(|violation| violation.field == field)
            .map(|violation| violation.kind)
    }

    /// Iterate the recorded violations in check order.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// Convert into `Ok(())` when empty, or `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// One sentence per failing field, joined with spaces.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "validation failed".to_owned();
        }
        self.0
            .iter()
            .map(|violation| format!("{}.", violation.message()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Field-keyed details for error payloads.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::{AccountField, FieldViolations, ViolationKind};
    ///
    /// let violations = FieldViolations::single(AccountField::Email, ViolationKind::InvalidFormat);
    /// let details = violations.to_details();
    /// assert_eq!(details["fields"]["email"]["code"], "invalid_format");
    /// ```
    pub fn to_details(&self) -> Value {
        let fields: Map<String, Value> = self
            .0
            .iter()
            .map(|violation| {
                (
                    violation.field.as_str().to_owned(),
                    json!({
                        "code": violation.kind.code(),
                        "message": violation.message(),
                    }),
                )
            })
            .collect();
        json!({ "fields": fields })
    }
}

impl fmt::Display for FieldViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for FieldViolations {}

/// Latest birth timestamp that still satisfies the minimum age.
///
/// Computed once per validation call so every age check in a request sees the
/// same instant.
///
/// # Examples
/// ```
/// use accounts::domain::AgeThreshold;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap();
/// let threshold = AgeThreshold::at(now);
/// assert!(threshold.admits(threshold.latest_birth_timestamp()));
/// assert!(!threshold.admits(threshold.latest_birth_timestamp() + 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeThreshold(i64);

impl AgeThreshold {
    /// Threshold for the minimum age relative to `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(now.timestamp() - MINIMUM_AGE_YEARS * SECONDS_PER_YEAR)
    }

    /// Most recent Unix timestamp an admissible birth date may carry.
    pub fn latest_birth_timestamp(self) -> i64 {
        self.0
    }

    /// Whether `date_of_birth` is at or before the threshold.
    pub fn admits(self, date_of_birth: i64) -> bool {
        date_of_birth <= self.0
    }
}

/// Check the full name length.
pub fn check_full_name(full_name: &str) -> Result<(), ViolationKind> {
    check_length(full_name, FULL_NAME_MIN, FULL_NAME_MAX)
}

/// Check the password length in characters and in encoded bytes.
pub fn check_password(password: &str) -> Result<(), ViolationKind> {
    check_length(password, PASSWORD_MIN, PASSWORD_MAX)?;
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ViolationKind::ByteLengthExceeded {
            max_bytes: PASSWORD_MAX_BYTES,
        });
    }
    Ok(())
}

fn check_length(value: &str, min: usize, max: usize) -> Result<(), ViolationKind> {
    let length = value.chars().count();
    if (min..=max).contains(&length) {
        Ok(())
    } else {
        Err(ViolationKind::LengthOutOfRange { min, max })
    }
}

/// Check that the phone number is in E.164 form.
pub fn check_phone_number(phone_number: &str) -> Result<(), ViolationKind> {
    if phone_number_regex().is_match(phone_number) {
        Ok(())
    } else {
        Err(ViolationKind::InvalidFormat)
    }
}

/// Check the email address grammar.
pub fn check_email(email: &str) -> Result<(), ViolationKind> {
    if email.len() <= EMAIL_MAX && email_regex().is_match(email) {
        Ok(())
    } else {
        Err(ViolationKind::InvalidFormat)
    }
}

/// Check that the birth date is present and old enough.
pub fn check_date_of_birth(
    date_of_birth: i64,
    threshold: AgeThreshold,
) -> Result<(), ViolationKind> {
    if date_of_birth == 0 {
        return Err(ViolationKind::RequiredFieldMissing);
    }
    if threshold.admits(date_of_birth) {
        Ok(())
    } else {
        Err(ViolationKind::BelowMinimumAge {
            years: MINIMUM_AGE_YEARS,
        })
    }
}

/// Validate every field of a registration candidate, collecting all failures.
pub fn validate_candidate(
    candidate: &RegistrationCandidate,
    threshold: AgeThreshold,
) -> Result<(), FieldViolations> {
    let mut violations = FieldViolations::new();
    violations.record(AccountField::FullName, check_full_name(candidate.full_name()));
    violations.record(
        AccountField::DateOfBirth,
        check_date_of_birth(candidate.date_of_birth(), threshold),
    );
    violations.record(
        AccountField::PhoneNumber,
        check_phone_number(candidate.phone_number()),
    );
    violations.record(AccountField::Email, check_email(candidate.email()));
    violations.record(AccountField::Password, check_password(candidate.password()));
    violations.into_result()
}

/// Validate the present fields of a patch, stopping at the first failure.
///
/// Fields are checked in the order full name, phone number, date of birth.
pub fn validate_patch(patch: &AccountPatch, threshold: AgeThreshold) -> Result<(), FieldViolations> {
    if let Some(full_name) = patch.full_name() {
        check_full_name(full_name)
            .map_err(|kind| FieldViolations::single(AccountField::FullName, kind))?;
    }
    if let Some(phone_number) = patch.phone_number() {
        check_phone_number(phone_number)
            .map_err(|kind| FieldViolations::single(AccountField::PhoneNumber, kind))?;
    }
    if let Some(date_of_birth) = patch.date_of_birth() {
        check_date_of_birth(date_of_birth, threshold)
            .map_err(|kind| FieldViolations::single(AccountField::DateOfBirth, kind))?;
    }
    Ok(())
}

/// Validate login inputs, collecting all failures.
pub fn validate_login(email: &str, password: &str) -> Result<(), FieldViolations> {
    let mut violations = FieldViolations::new();
    violations.record(AccountField::Email, check_email(email));
    violations.record(AccountField::Password, check_password(password));
    violations.into_result()
}
