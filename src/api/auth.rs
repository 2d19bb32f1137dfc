use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use constant_time_eq::constant_time_eq;

use super::ApiState;
use crate::logging::kv;

/// Token check for privileged routes, compared in constant time. An empty
/// configured token rejects every request.
pub fn is_authorized(headers: &HeaderMap, state: &ApiState) -> bool {
    if state.auth_token.is_empty() {
        return false;
    }
    headers
        .get(&state.auth_header)
        .map(|value| constant_time_eq(value.as_bytes(), state.auth_token.as_bytes()))
        .unwrap_or(false)
}

pub async fn require_token(State(state): State<ApiState>, request: Request, next: Next) -> Response {
    if !is_authorized(request.headers(), &state) {
        state.log.warn(
            format_args!("unauthorized request rejected"),
            &[
                kv("method", request.method()),
                kv("path", &request.uri().path()),
            ],
        );
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}
