//! Blockchain network health monitoring.
//!
//! Node telemetry is fetched from a [`NodeStatsSource`], filtered to the
//! monitored network and evaluated against [`Criteria`]. Each evaluation
//! becomes a [`StatsSnapshot`] in a bounded history, and consecutive
//! alerting cycles grow an error streak that decides whether the network
//! is reported as stable.

pub mod criteria;
pub mod history;
pub mod monitor;
pub mod nodes;
pub mod runtime;
pub mod scraper;
pub mod state;

pub use criteria::{Criteria, CriteriaEngine, DownNodesCriterion, HeightCriterion, StateHashCriterion};
pub use history::{SnapshotHistory, StatsSnapshot};
pub use monitor::{CheckOutcome, MonitorSettings, NetworkMonitor, NetworkStatusInfo};
pub use nodes::{NetworkScheme, NodeRecord, NodeSet, DOWN_HEIGHT};
pub use runtime::MonitorRuntime;
pub use scraper::{HttpNodeStatsSource, NodeStatsSource};
pub use state::MonitorState;
