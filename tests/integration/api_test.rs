use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{HeaderName, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use tower::ServiceExt; // for `oneshot`

use netmon::api::handlers::{HealthResponse, StateResponse};
use netmon::api::{router, ApiState};
use netmon::core::network_monitor::{
    Criteria, MonitorSettings, MonitorState, NetworkMonitor, NetworkScheme, NetworkStatusInfo,
    NodeRecord, NodeSet, NodeStatsSource,
};
use netmon::logging::{Logger, MemorySink};

const AUTH_HEADER: &str = "x-waves-monitor-auth";

struct FixedSource(NodeSet);

#[async_trait]
impl NodeStatsSource for FixedSource {
    async fn fetch(&self) -> netmon::Result<NodeSet> {
        Ok(self.0.clone())
    }
}

fn setup(threshold: usize) -> (Router, Arc<NetworkMonitor>) {
    let nodes = NodeSet::from(vec![
        NodeRecord::new("a", NetworkScheme::Mainnet, 500),
        NodeRecord::new("b", NetworkScheme::Mainnet, -1),
        NodeRecord::new("c", NetworkScheme::Mainnet, 500),
    ]);
    let log = Logger::new(Arc::new(MemorySink::default()));
    let settings = MonitorSettings {
        initial_state: MonitorState::Active,
        network: NetworkScheme::Mainnet,
        history_size: 10,
        alert_streak_threshold: threshold,
        criteria: Criteria::default(),
    };
    let monitor = Arc::new(
        NetworkMonitor::new(settings, Arc::new(FixedSource(nodes)), log.clone()).unwrap(),
    );
    let state = ApiState::new(
        monitor.clone(),
        HeaderName::from_static(AUTH_HEADER),
        "token",
        log,
    );
    (router(state), monitor)
}

async fn get_json<T: serde::de::DeserializeOwned>(app: &Router, uri: &str) -> T {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn post_state(app: &Router, state: &str) -> StatusCode {
    let req = Request::builder()
        .method("POST")
        .uri("/state")
        .header("content-type", "application/json")
        .header(AUTH_HEADER, "token")
        .body(Body::from(format!(r#"{{"state":"{}"}}"#, state)))
        .unwrap();
    app.clone().oneshot(req).await.unwrap().status()
}

#[tokio::test]
async fn test_status_reflects_checks() {
    let (app, monitor) = setup(1);

    let info: NetworkStatusInfo = get_json(&app, "/status").await;
    assert_eq!(info.height, -1);
    assert_eq!(info.network, NetworkScheme::Mainnet);
    assert_eq!(info.updated, Utc.timestamp_opt(0, 0).unwrap());
    assert!(info.status);

    let now = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
    monitor.check_nodes(now).await.unwrap();

    let info: NetworkStatusInfo = get_json(&app, "/status").await;
    assert_eq!(info.height, 500);
    assert_eq!(info.updated, now);
    assert!(!info.status);

    let health: HealthResponse = get_json(&app, "/health").await;
    assert!(!health.status);
}

#[tokio::test]
async fn test_state_switching() {
    let (app, monitor) = setup(1);
    monitor.check_nodes(Utc::now()).await.unwrap();

    let state: StateResponse = get_json(&app, "/state").await;
    assert_eq!(state.state, MonitorState::Active);

    assert_eq!(post_state(&app, "frozen_operates_stable").await, StatusCode::OK);
    let state: StateResponse = get_json(&app, "/state").await;
    assert_eq!(state.state, MonitorState::FrozenOperatesStable);
    let health: HealthResponse = get_json(&app, "/health").await;
    assert!(health.status);

    assert_eq!(post_state(&app, "frozen_degraded").await, StatusCode::OK);
    let health: HealthResponse = get_json(&app, "/health").await;
    assert!(!health.status);

    assert_eq!(post_state(&app, "sleeping").await, StatusCode::BAD_REQUEST);
    assert_eq!(monitor.state(), MonitorState::FrozenDegraded);
}

#[tokio::test]
async fn test_status_wire_format() {
    let (app, monitor) = setup(5);
    monitor
        .check_nodes(Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap())
        .await
        .unwrap();

    let value: serde_json::Value = get_json(&app, "/status").await;
    assert_eq!(
        value,
        serde_json::json!({
            "updated": "2021-06-01T12:00:00Z",
            "network": "W",
            "status": true,
            "height": 500,
        })
    );
}
