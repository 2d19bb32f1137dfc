//! HTTP API of the monitor.
//!
//! `GET /health`, `GET /status` and `GET /state` are public. `POST /state`
//! switches the monitor state and requires the configured auth header.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::handler::Handler;
use axum::http::HeaderName;
use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::core::network_monitor::NetworkMonitor;
use crate::logging::Logger;

#[derive(Clone)]
pub struct ApiState {
    pub monitor: Arc<NetworkMonitor>,
    pub auth_header: HeaderName,
    pub auth_token: Arc<str>,
    pub log: Logger,
}

impl ApiState {
    pub fn new(
        monitor: Arc<NetworkMonitor>,
        auth_header: HeaderName,
        auth_token: impl Into<Arc<str>>,
        log: Logger,
    ) -> Self {
        Self {
            monitor,
            auth_header,
            auth_token: auth_token.into(),
            log,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    let set_state = handlers::set_state.layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_token,
    ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/state", get(handlers::get_state).post(set_state))
        .with_state(state)
}
