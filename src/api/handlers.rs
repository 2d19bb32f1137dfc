use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::core::network_monitor::{MonitorState, NetworkStatusInfo};
use crate::logging::kv;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: MonitorState,
}

#[derive(Debug, Deserialize)]
struct StateChangeRequest {
    state: String,
}

pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.monitor.network_operates_stable(),
    })
}

pub async fn status(State(state): State<ApiState>) -> Json<NetworkStatusInfo> {
    Json(state.monitor.network_status_info())
}

pub async fn get_state(State(state): State<ApiState>) -> Json<StateResponse> {
    Json(StateResponse {
        state: state.monitor.state(),
    })
}

/// Body is decoded by hand so that every malformed request maps to 400.
pub async fn set_state(State(state): State<ApiState>, body: Bytes) -> (StatusCode, &'static str) {
    let request: StateChangeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            state.log.warn(
                format_args!("invalid set monitor state request"),
                &[kv("error", &err)],
            );
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let new_state: MonitorState = match request.state.parse() {
        Ok(new_state) => new_state,
        Err(err) => {
            state.log.warn(
                format_args!("invalid set monitor state request"),
                &[kv("error", &err)],
            );
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let previous = state.monitor.change_state(new_state);
    state.log.info(
        format_args!("monitor state has been successfully changed"),
        &[kv("from", &previous), kv("to", &new_state)],
    );
    (StatusCode::OK, "")
}
