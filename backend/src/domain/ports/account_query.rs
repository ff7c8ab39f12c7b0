//! Driving port for account listings.

use async_trait::async_trait;

use crate::domain::{Account, AccountError};

/// Domain use-case port for reading accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Return every live account.
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountError>;
}
