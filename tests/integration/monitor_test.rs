use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use log::Level;
use parking_lot::Mutex;

use netmon::core::network_monitor::{
    CheckOutcome, Criteria, HttpNodeStatsSource, MonitorRuntime, MonitorSettings, MonitorState,
    NetworkMonitor, NetworkScheme,
};
use netmon::logging::{Logger, MemorySink};

const HEALTHY: &str = r#"{
  "node-1.example.com": {"netbyte": "W", "height": 1000, "statehash": "aa", "statehash_height": 998, "version": "v1.4.0"},
  "node-2.example.com": {"netbyte": "W", "height": 1000, "statehash": "aa", "statehash_height": 998, "version": "v1.4.0"},
  "node-3.example.com": {"netbyte": "W", "height": 1001, "statehash": "aa", "statehash_height": "998", "version": "v1.4.0"},
  "node-4.example.com": {"netbyte": "W", "height": 1001, "statehash": "aa", "statehash_height": "998", "version": "v1.4.0"},
  "test-1.example.com": {"netbyte": "T", "height": -1, "statehash": null, "statehash_height": 0, "version": null}
}"#;

const DEGRADED: &str = r#"{
  "node-1.example.com": {"netbyte": "W", "height": 1005, "statehash": "aa", "statehash_height": 1003, "version": "v1.4.0"},
  "node-2.example.com": {"netbyte": "W", "height": -1, "statehash": null, "statehash_height": 0, "version": null},
  "node-3.example.com": {"netbyte": "W", "height": -1, "statehash": null, "statehash_height": 0, "version": null},
  "node-4.example.com": {"netbyte": "W", "height": 1005, "statehash": "aa", "statehash_height": 1003, "version": "v1.4.0"}
}"#;

/// Stats service whose payload can be swapped between requests.
async fn stats_service(payload: Arc<Mutex<&'static str>>) -> String {
    async fn stats(State(payload): State<Arc<Mutex<&'static str>>>) -> &'static str {
        *payload.lock()
    }

    let app = Router::new().route("/", get(stats)).with_state(payload);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

fn monitor(url: String, threshold: usize, sink: Arc<MemorySink>) -> Arc<NetworkMonitor> {
    let log = Logger::new(sink);
    let source = HttpNodeStatsSource::new(url, 128 * 1024, Duration::from_secs(5), log.clone()).unwrap();
    let settings = MonitorSettings {
        initial_state: MonitorState::Active,
        network: NetworkScheme::Mainnet,
        history_size: 4,
        alert_streak_threshold: threshold,
        criteria: Criteria::default(),
    };
    Arc::new(NetworkMonitor::new(settings, Arc::new(source), log).unwrap())
}

#[tokio::test]
async fn test_streak_over_http_source() {
    let payload = Arc::new(Mutex::new(HEALTHY));
    let url = stats_service(payload.clone()).await;
    let sink = Arc::new(MemorySink::default());
    let mon = monitor(url, 2, sink.clone());

    let outcome = mon.check_nodes(Utc::now()).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Evaluated { alert: false, error_streak: 0 });
    assert!(mon.network_operates_stable());
    assert_eq!(mon.network_status_info().height, 1001);
    // the testnet node is filtered out
    assert_eq!(mon.latest_snapshot().unwrap().nodes.len(), 4);

    *payload.lock() = DEGRADED;
    mon.check_nodes(Utc::now()).await.unwrap();
    assert!(mon.network_operates_stable());
    mon.check_nodes(Utc::now()).await.unwrap();
    assert!(!mon.network_operates_stable());
    assert_eq!(mon.error_streak(), 2);

    let snapshot = mon.latest_snapshot().unwrap();
    assert!(snapshot.down_nodes_alert);
    assert_eq!(snapshot.max_height, 1005);

    // freezing as stable overrides the streak and resets it
    mon.change_state(MonitorState::FrozenOperatesStable);
    assert!(mon.network_operates_stable());
    assert_eq!(mon.error_streak(), 0);
    assert_eq!(
        mon.check_nodes(Utc::now()).await.unwrap(),
        CheckOutcome::Frozen(MonitorState::FrozenOperatesStable)
    );

    // back to active with a healthy network
    *payload.lock() = HEALTHY;
    mon.change_state(MonitorState::Active);
    mon.check_nodes(Utc::now()).await.unwrap();
    assert!(mon.network_operates_stable());
    assert_eq!(mon.history_len(), 4);

    assert!(sink.contains(Level::Debug, "network error detected"));
}

#[tokio::test]
async fn test_runtime_against_unreachable_service() {
    // nothing listens on the discard port
    let sink = Arc::new(MemorySink::default());
    let mon = monitor("http://127.0.0.1:9/".to_string(), 1, sink.clone());

    let runtime = MonitorRuntime::spawn(mon.clone(), Duration::from_millis(20), Logger::new(sink.clone()));
    tokio::time::timeout(Duration::from_secs(10), async {
        while !sink.contains(Level::Error, "failed to check nodes status") {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    runtime.shutdown().await;

    assert_eq!(mon.history_len(), 0);
    assert!(mon.network_operates_stable());
    assert_eq!(mon.network_status_info().height, -1);
}
