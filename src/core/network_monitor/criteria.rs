//! Degradation criteria.
//!
//! Each criterion has a population requirement that must be met before its
//! alert threshold is even looked at: a divergence computed over too few
//! nodes must not fire.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::StatsSnapshot;
use super::nodes::{NodeSet, DOWN_HEIGHT};
use crate::error::{NetmonError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownNodesCriterion {
    /// Alert when at least this part of all nodes is down. Exclusive (0, 1).
    pub total_down_fraction: f64,
}

impl DownNodesCriterion {
    pub fn validate(&self) -> Result<()> {
        // also rejects NaN
        if !(self.total_down_fraction > 0.0 && self.total_down_fraction < 1.0) {
            return Err(NetmonError::config(format!(
                "down nodes criterion: total down fraction must be in (0, 1), got {}",
                self.total_down_fraction
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightCriterion {
    pub height_diff: i64,
    /// Nodes required on both the lowest and the highest height.
    pub min_nodes_on_extreme_height: usize,
}

impl HeightCriterion {
    pub fn validate(&self) -> Result<()> {
        if self.height_diff <= 0 {
            return Err(NetmonError::config(format!(
                "height criterion: height diff must be greater than zero, got {}",
                self.height_diff
            )));
        }
        if self.min_nodes_on_extreme_height == 0 {
            return Err(NetmonError::config(
                "height criterion: min nodes on extreme height must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateHashCriterion {
    pub min_groups_on_same_height: usize,
    pub min_valuable_groups: usize,
    pub min_nodes_per_valuable_group: usize,
    /// Heights with fewer nodes are skipped.
    pub min_nodes_on_height: usize,
}

impl StateHashCriterion {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("min groups on same height", self.min_groups_on_same_height),
            ("min valuable groups", self.min_valuable_groups),
            ("min nodes per valuable group", self.min_nodes_per_valuable_group),
            ("min nodes on height", self.min_nodes_on_height),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(NetmonError::config(format!(
                    "state hash criterion: {} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Full criteria set, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub down_nodes: DownNodesCriterion,
    pub height: HeightCriterion,
    pub state_hash: StateHashCriterion,
}

impl Criteria {
    pub fn validate(&self) -> Result<()> {
        self.down_nodes.validate()?;
        self.height.validate()?;
        self.state_hash.validate()
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            down_nodes: DownNodesCriterion {
                total_down_fraction: 0.3,
            },
            height: HeightCriterion {
                height_diff: 5,
                min_nodes_on_extreme_height: 2,
            },
            state_hash: StateHashCriterion {
                min_groups_on_same_height: 2,
                min_valuable_groups: 2,
                min_nodes_per_valuable_group: 2,
                min_nodes_on_height: 4,
            },
        }
    }
}

/// Evaluates one node set against the criteria.
pub struct CriteriaEngine<'a> {
    criteria: &'a Criteria,
    all_nodes: &'a NodeSet,
    down_nodes: NodeSet,
    working_nodes: NodeSet,
    working_nodes_on_height: BTreeMap<i64, NodeSet>,
}

impl<'a> CriteriaEngine<'a> {
    /// Fails with [`NetmonError::EmptyNodes`] when there is nothing to
    /// evaluate.
    pub fn new(criteria: &'a Criteria, all_nodes: &'a NodeSet) -> Result<Self> {
        if all_nodes.is_empty() {
            return Err(NetmonError::EmptyNodes);
        }
        let working_nodes = all_nodes.working_nodes();
        let working_nodes_on_height = working_nodes.group_by_height();
        Ok(Self {
            criteria,
            all_nodes,
            down_nodes: all_nodes.down_nodes(),
            working_nodes,
            working_nodes_on_height,
        })
    }

    pub fn alert_down_nodes(&self) -> bool {
        let total_down_part = self.down_nodes.len() as f64 / self.all_nodes.len() as f64;
        total_down_part >= self.criteria.down_nodes.total_down_fraction
    }

    pub fn alert_height_divergence(&self) -> bool {
        let (Some((&min_height, lowest)), Some((&max_height, highest))) = (
            self.working_nodes_on_height.first_key_value(),
            self.working_nodes_on_height.last_key_value(),
        ) else {
            return false;
        };

        // check requirement
        let required = self.criteria.height.min_nodes_on_extreme_height;
        if lowest.len() < required || highest.len() < required {
            return false;
        }

        max_height - min_height >= self.criteria.height.height_diff
    }

    pub fn alert_state_hash_divergence(&self) -> bool {
        let criterion = &self.criteria.state_hash;

        self.working_nodes_on_height.values().any(|nodes_on_height| {
            // check requirement
            if nodes_on_height.len() < criterion.min_nodes_on_height {
                return false;
            }

            let by_state_hash = nodes_on_height.group_by_state_hash();
            if by_state_hash.len() < criterion.min_groups_on_same_height {
                return false;
            }

            let valuable_groups = by_state_hash
                .values()
                .filter(|group| group.len() >= criterion.min_nodes_per_valuable_group)
                .count();
            valuable_groups >= criterion.min_valuable_groups
        })
    }

    /// Highest height across all working nodes, or [`DOWN_HEIGHT`].
    pub fn current_max_height(&self) -> i64 {
        self.working_nodes
            .iter()
            .map(|node| node.height)
            .max()
            .unwrap_or(DOWN_HEIGHT)
    }

    /// Run every criterion and package the outcome as a snapshot taken at
    /// `now`.
    pub fn evaluate(&self, now: DateTime<Utc>) -> StatsSnapshot {
        StatsSnapshot {
            created_at: now,
            nodes: self.all_nodes.clone(),
            max_height: self.current_max_height(),
            down_nodes_alert: self.alert_down_nodes(),
            height_alert: self.alert_height_divergence(),
            state_hash_alert: self.alert_state_hash_divergence(),
        }
    }
}
