use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NetmonError, Result};

/// Operational state of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// Cycles fetch telemetry and update the error streak.
    Active,
    /// Administrative override: always reported as stable.
    FrozenOperatesStable,
    /// Administrative override: always reported as degraded.
    FrozenDegraded,
}

impl MonitorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorState::Active => "active",
            MonitorState::FrozenOperatesStable => "frozen_operates_stable",
            MonitorState::FrozenDegraded => "frozen_degraded",
        }
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitorState {
    type Err = NetmonError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(MonitorState::Active),
            "frozen_operates_stable" => Ok(MonitorState::FrozenOperatesStable),
            "frozen_degraded" => Ok(MonitorState::FrozenDegraded),
            _ => Err(NetmonError::invalid_state(s)),
        }
    }
}
