//! Login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing a constructor
//! that validates string inputs before a handler talks to a port or service.

use zeroize::Zeroizing;

use super::validation::{FieldViolations, validate_login};

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `email` is trimmed and follows the email grammar.
/// - `password` is between 8 and 30 characters and keeps caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use accounts::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" jane@example.com ", "correcthorse").unwrap();
/// assert_eq!(creds.email(), "jane@example.com");
/// assert_eq!(creds.password(), "correcthorse");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, FieldViolations> {
        let email = email.trim();
        validate_login(email, password)?;
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used to look up the account.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
