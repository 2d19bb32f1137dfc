use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::nodes::NodeSet;

/// Result of one successful evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub created_at: DateTime<Utc>,
    pub nodes: NodeSet,
    pub max_height: i64,
    pub down_nodes_alert: bool,
    pub height_alert: bool,
    pub state_hash_alert: bool,
}

impl StatsSnapshot {
    /// Whether any criterion fired for this snapshot
    pub fn has_alert(&self) -> bool {
        self.down_nodes_alert || self.height_alert || self.state_hash_alert
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(created_at: {}, nodes: {}, max_height: {}, down_nodes_alert: {}, height_alert: {}, state_hash_alert: {})",
            self.created_at.to_rfc3339(),
            self.nodes.len(),
            self.max_height,
            self.down_nodes_alert,
            self.height_alert,
            self.state_hash_alert,
        )
    }
}

/// Bounded most-recent-first buffer of evaluation snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    capacity: NonZeroUsize,
    snapshots: VecDeque<StatsSnapshot>,
}

impl SnapshotHistory {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            snapshots: VecDeque::with_capacity(capacity.get()),
        }
    }

    /// Push to the front. When the buffer is full the oldest snapshot is
    /// popped from the back first and handed back to the caller.
    pub fn push_front(&mut self, snapshot: StatsSnapshot) -> Option<StatsSnapshot> {
        let evicted = if self.snapshots.len() >= self.capacity.get() {
            self.snapshots.pop_back()
        } else {
            None
        };
        self.snapshots.push_front(snapshot);
        evicted
    }

    /// Most recent snapshot
    pub fn front(&self) -> Option<&StatsSnapshot> {
        self.snapshots.front()
    }

    /// Oldest snapshot still kept
    pub fn back(&self) -> Option<&StatsSnapshot> {
        self.snapshots.back()
    }

    pub fn at(&self, index: usize) -> Option<&StatsSnapshot> {
        self.snapshots.get(index)
    }

    /// Iterate from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &StatsSnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
