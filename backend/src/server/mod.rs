//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AccountsSettings, ServerConfig};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use accounts::RequestLog;
use accounts::inbound::http::accounts::configure;
use accounts::inbound::http::state::HttpState;
use state_builders::build_http_state;

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .wrap(RequestLog)
        .configure(configure)
}

/// Construct an Actix HTTP server for the configured account store.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the store cannot be prepared or the
/// socket cannot be bound.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config).await?);
    let ServerConfig { bind_addr, .. } = config;

    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(bind_addr.clone())?
        .run();

    info!(host = %bind_addr.0, port = bind_addr.1, "accounts server listening");
    Ok(server)
}
