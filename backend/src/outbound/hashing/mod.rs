//! bcrypt-backed credential hasher.
//!
//! Hashes are salted per call and encoded in the modular crypt format, so the
//! stored string carries its own cost and salt. Verification delegates to the
//! bcrypt crate, which compares digests in constant time.

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Default bcrypt work factor.
pub const DEFAULT_COST: u32 = 8;
/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;
/// bcrypt only reads this many bytes of input; longer secrets are refused.
pub const MAX_PLAINTEXT_BYTES: usize = 72;

/// Error returned when a configured cost is outside bcrypt's accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bcrypt cost {cost} is outside {}..={}", MIN_COST, MAX_COST)]
pub struct InvalidCost {
    pub cost: u32,
}

/// [`CredentialHasher`] implementation using bcrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptCredentialHasher {
    cost: u32,
}

impl BcryptCredentialHasher {
    /// Build a hasher with an explicit work factor.
    pub fn with_cost(cost: u32) -> Result<Self, InvalidCost> {
        if (MIN_COST..=MAX_COST).contains(&cost) {
            Ok(Self { cost })
        } else {
            Err(InvalidCost { cost })
        }
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptCredentialHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher for BcryptCredentialHasher {
    fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialHasherError> {
        if plaintext.len() > MAX_PLAINTEXT_BYTES {
            return Err(CredentialHasherError::hash(format!(
                "password exceeds {MAX_PLAINTEXT_BYTES} bytes"
            )));
        }
        bcrypt::hash(plaintext, self.cost)
            .map(PasswordHash::new)
            .map_err(|error| CredentialHasherError::hash(error.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, CredentialHasherError> {
        if plaintext.len() > MAX_PLAINTEXT_BYTES {
            return Ok(false);
        }
        bcrypt::verify(plaintext, hash.as_str()).map_err(|error| {
            tracing::debug!(%error, "bcrypt rejected stored hash");
            CredentialHasherError::corrupt_hash()
        })
    }
}
