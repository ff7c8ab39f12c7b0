//! Port for one-way password hashing.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hasher adapters.
    pub enum CredentialHasherError {
        /// Hashing the plaintext failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        CorruptHash => "stored password hash is malformed",
    }
}

/// Salted, deliberately slow password hashing.
///
/// `verify` compares in time independent of where a mismatch occurs.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password.
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialHasherError>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CredentialHasherError>;
}
