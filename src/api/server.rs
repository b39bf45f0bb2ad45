use crate::api::routes;
use crate::auth::AuthGate;
use crate::config::Shared;
use crate::update::DynUpdateExecutor;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: Shared,
    pub gate: AuthGate,
    pub executor: DynUpdateExecutor,
}

/// Build the HTTP [`Router`] for the given configuration, handing authenticated updates to
/// `executor`. Handlers need the peer address, so serve it with
/// [`Router::into_make_service_with_connect_info`].
pub fn router(config: Shared, executor: DynUpdateExecutor) -> Router {
    let gate = AuthGate::new(config.clone());
    routes::new(AppState {
        config,
        gate,
        executor,
    })
}

/// Bind [`ServerSettings::bind_addr`][crate::config::ServerSettings::bind_addr] and return the
/// server future.
///
/// # Errors
///
/// Returns a [`hyper::Error`] if the address can't be bound.
pub fn new(
    config: Shared,
    executor: DynUpdateExecutor,
) -> hyper::Result<impl Future<Output = hyper::Result<()>>> {
    let server = axum::Server::try_bind(&config.server.bind_addr)?;
    Ok(server.serve(router(config, executor).into_make_service_with_connect_info::<SocketAddr>()))
}
