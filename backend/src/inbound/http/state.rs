//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, AccountQuery, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Bundle the port implementations.
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        accounts_query: Arc<dyn AccountQuery>,
        login: Arc<dyn LoginService>,
    ) -> Self {
        Self {
            accounts,
            accounts_query,
            login,
        }
    }

    /// Use one service for every port.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: AccountCommand + AccountQuery + LoginService + 'static,
    {
        Self {
            accounts: service.clone(),
            accounts_query: service.clone(),
            login: service,
        }
    }
}
