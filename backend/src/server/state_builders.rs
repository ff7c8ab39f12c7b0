//! Builders wiring the configured account store into HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use accounts::domain::AccountService;
use accounts::domain::ports::AccountRepository;
use accounts::inbound::http::state::HttpState;
use accounts::outbound::hashing::BcryptCredentialHasher;
use accounts::outbound::memory::InMemoryAccountRepository;
use accounts::outbound::persistence::{
    DbPool, DieselAccountRepository, PoolConfig, run_pending_migrations,
};

use super::config::{ServerConfig, StoreBackend};

/// Wrap a repository in an account service and expose it on every port.
fn state_for_repository<R>(repository: R, hasher: BcryptCredentialHasher) -> HttpState
where
    R: AccountRepository + 'static,
{
    let service = AccountService::new(
        Arc::new(repository),
        Arc::new(hasher),
        Arc::new(DefaultClock),
    );
    HttpState::from_service(Arc::new(service))
}

/// Apply migrations and open the connection pool.
async fn connect_postgres(database_url: &str) -> std::io::Result<DbPool> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations complete");

    DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(std::io::Error::other)
}

/// Build handler state for the configured store.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the hasher cost is invalid or the
/// durable store cannot be migrated or connected.
pub(super) async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let hasher =
        BcryptCredentialHasher::with_cost(config.password_cost).map_err(std::io::Error::other)?;

    match &config.store {
        StoreBackend::InMemory => {
            info!("using in-memory account store");
            Ok(state_for_repository(InMemoryAccountRepository::new(), hasher))
        }
        StoreBackend::Postgres { database_url } => {
            let pool = connect_postgres(database_url).await?;
            info!("using PostgreSQL account store");
            Ok(state_for_repository(DieselAccountRepository::new(pool), hasher))
        }
    }
}
