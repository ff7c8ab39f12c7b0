//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to authenticate credentials without
//! knowing the backing infrastructure, so HTTP handler tests can substitute
//! a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{AccountError, AccountId, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated account id.
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> Result<AccountId, AccountError>;
}
