use crate::api::api_error::APIError;
use crate::api::model::{self, UpdateResponse};
use crate::api::server::AppState;
use crate::auth::{FormValues, Outcome};
use crate::update::UpdateRequest;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Form, Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route(&state.config.server.update_path, get(update).post(update))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.server.timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn update(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    WithRejection(Query(query), _): WithRejection<Query<FormValues>, APIError>,
    body: Option<Form<FormValues>>,
) -> UpdateResponse {
    let form = model::merge_form(query, body.map(|Form(body)| body));
    let address = state
        .config
        .server
        .client_address
        .resolve(client_addr, &headers);
    tracing::debug!("update request from {client_addr}, client address {address:?}");

    let user = match state.gate.authenticate(&headers, &form).await {
        Outcome::Authenticated(user) => user,
        _ => return UpdateResponse::BadAuth,
    };

    let requested = match form
        .get("hostname")
        .map(String::as_str)
        .map(model::parse_hostnames)
    {
        Some(Ok(hostnames)) if !hostnames.is_empty() => hostnames,
        Some(Err(err)) => {
            tracing::debug!("rejected update by {user}: {err}");
            return UpdateResponse::NoHost;
        }
        _ => return UpdateResponse::NotFqdn,
    };

    let mut hostnames = Vec::with_capacity(requested.len());
    for hostname in requested {
        let key = match (state.config.owner_of(&hostname), state.config.key_for(&hostname)) {
            (Some(owner), Some(key)) if owner == user => key.clone(),
            _ => {
                tracing::warn!("user {user} may not update \"{hostname}\"");
                return UpdateResponse::NoHost;
            }
        };
        hostnames.push((hostname, key));
    }

    let request = UpdateRequest {
        user,
        address: address.clone(),
        hostnames,
    };
    match state.executor.update(request).await {
        Ok(()) => UpdateResponse::Good(address),
        Err(err) => {
            tracing::error!("update failed: {err}");
            UpdateResponse::DnsErr
        }
    }
}
