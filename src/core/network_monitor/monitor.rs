//! The network monitor state machine.
//!
//! Shared state (monitor state, error streak, snapshot history) sits behind a
//! single read/write lock. The telemetry fetch runs with no lock held; the
//! state is checked once before the fetch and again under the write lock
//! before the results are committed, so a fetch that was started while
//! `Active` is dropped if the monitor got frozen in the meantime.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::criteria::{Criteria, CriteriaEngine};
use super::history::{SnapshotHistory, StatsSnapshot};
use super::nodes::{NetworkScheme, DOWN_HEIGHT};
use super::scraper::NodeStatsSource;
use super::state::MonitorState;
use crate::error::{NetmonError, Result};
use crate::logging::{kv, Logger};

/// Externally reported network status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatusInfo {
    pub updated: DateTime<Utc>,
    pub network: NetworkScheme,
    pub status: bool,
    pub height: i64,
}

/// Construction parameters for [`NetworkMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub initial_state: MonitorState,
    pub network: NetworkScheme,
    pub history_size: usize,
    /// Consecutive alerting cycles after which the network is degraded.
    pub alert_streak_threshold: usize,
    pub criteria: Criteria,
}

/// What a call to [`NetworkMonitor::check_nodes`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Monitor was frozen; nothing was fetched.
    Frozen(MonitorState),
    /// Monitor was frozen while the fetch was in flight; results dropped.
    Discarded(MonitorState),
    /// A snapshot was committed.
    Evaluated { alert: bool, error_streak: usize },
}

struct MonitorInner {
    state: MonitorState,
    history: SnapshotHistory,
    error_streak: usize,
}

impl MonitorInner {
    fn operates_stable(&self, threshold: usize) -> bool {
        match self.state {
            MonitorState::Active => self.error_streak < threshold,
            MonitorState::FrozenDegraded => false,
            MonitorState::FrozenOperatesStable => true,
        }
    }
}

pub struct NetworkMonitor {
    network: NetworkScheme,
    criteria: Criteria,
    alert_streak_threshold: usize,
    source: Arc<dyn NodeStatsSource>,
    log: Logger,
    inner: RwLock<MonitorInner>,
}

impl NetworkMonitor {
    pub fn new(
        settings: MonitorSettings,
        source: Arc<dyn NodeStatsSource>,
        log: Logger,
    ) -> Result<Self> {
        let history_size = NonZeroUsize::new(settings.history_size)
            .ok_or_else(|| NetmonError::config("stats history size should be greater than zero"))?;
        if settings.alert_streak_threshold < 1 {
            return Err(NetmonError::config(
                "network errors streak should be greater than zero",
            ));
        }
        if !settings.network.is_known() {
            return Err(NetmonError::config(
                "monitored network scheme must be one of W, T, S or E",
            ));
        }
        settings.criteria.validate()?;

        Ok(Self {
            network: settings.network,
            criteria: settings.criteria,
            alert_streak_threshold: settings.alert_streak_threshold,
            source,
            log,
            inner: RwLock::new(MonitorInner {
                state: settings.initial_state,
                history: SnapshotHistory::new(history_size),
                error_streak: 0,
            }),
        })
    }

    /// Run one evaluation cycle with `now` as the snapshot time.
    pub async fn check_nodes(&self, now: DateTime<Utc>) -> Result<CheckOutcome> {
        let state = self.state();
        if state != MonitorState::Active {
            self.log.debug(
                format_args!("monitor is frozen, skipping nodes check"),
                &[kv("state", &state)],
            );
            return Ok(CheckOutcome::Frozen(state));
        }

        let all_networks_nodes = self.source.fetch().await?;

        let mut inner = self.inner.write();

        if inner.state != MonitorState::Active {
            self.log.debug(
                format_args!("monitor was frozen during nodes fetch, dropping results"),
                &[kv("state", &inner.state)],
            );
            return Ok(CheckOutcome::Discarded(inner.state));
        }

        let nodes = all_networks_nodes.filter_by_network(self.network);
        let snapshot = CriteriaEngine::new(&self.criteria, &nodes)?.evaluate(now);
        let alert = snapshot.has_alert();

        self.log.debug(
            format_args!("fresh stats pushed to history"),
            &[kv("stats", &snapshot)],
        );
        if let Some(outdated) = inner.history.push_front(snapshot) {
            self.log.debug(
                format_args!("outdated stats dropped from history"),
                &[kv("stats", &outdated)],
            );
        }

        if alert {
            inner.error_streak += 1;
            self.log.debug(
                format_args!("network error detected, error streak increased"),
                &[
                    kv("network", &self.network),
                    kv("error_streak", &inner.error_streak),
                ],
            );
        } else {
            inner.error_streak = 0;
            self.log.debug(
                format_args!("network operates normally"),
                &[kv("network", &self.network)],
            );
        }

        Ok(CheckOutcome::Evaluated {
            alert,
            error_streak: inner.error_streak,
        })
    }

    pub fn network_status_info(&self) -> NetworkStatusInfo {
        let inner = self.inner.read();

        let mut info = NetworkStatusInfo {
            updated: DateTime::<Utc>::default(),
            network: self.network,
            status: inner.operates_stable(self.alert_streak_threshold),
            height: DOWN_HEIGHT,
        };
        if let Some(front) = inner.history.front() {
            info.height = front.max_height;
            info.updated = front.created_at;
        }
        info
    }

    pub fn network_operates_stable(&self) -> bool {
        self.inner.read().operates_stable(self.alert_streak_threshold)
    }

    pub fn state(&self) -> MonitorState {
        self.inner.read().state
    }

    /// Switch to `state`. Moving to a different state resets the error
    /// streak; re-applying the current state keeps it. Returns the previous
    /// state.
    pub fn change_state(&self, state: MonitorState) -> MonitorState {
        let mut inner = self.inner.write();

        let previous = inner.state;
        if previous == state {
            return previous;
        }

        self.log.debug(
            format_args!("changing monitor state"),
            &[kv("from", &previous), kv("to", &state)],
        );
        inner.state = state;
        inner.error_streak = 0;
        previous
    }

    pub fn network(&self) -> NetworkScheme {
        self.network
    }

    pub fn error_streak(&self) -> usize {
        self.inner.read().error_streak
    }

    pub fn history_len(&self) -> usize {
        self.inner.read().history.len()
    }

    pub fn latest_snapshot(&self) -> Option<StatsSnapshot> {
        self.inner.read().history.front().cloned()
    }
}
