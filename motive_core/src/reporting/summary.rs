//! Per-actor goal summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use motive_model::{Goal, GoalStatus, Horizon};

/// Counts and highlights of one actor's goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub total: usize,

    /// Every horizon is present, zero when unused.
    pub by_horizon: BTreeMap<Horizon, usize>,

    /// Every status is present, zero when unused.
    pub by_status: BTreeMap<GoalStatus, usize>,

    /// The most urgent active goals, in selection order.
    pub top_active: Vec<Goal>,

    /// Completed / total, or 0.0 when there are no goals.
    pub completion_rate: f32,
}

impl GoalSummary {
    /// Summary of an actor with no goals.
    pub fn empty() -> Self {
        Self::from_goals(&[], &[], 0)
    }

    /// Build from all of an actor's goals and its ordered active goals.
    pub fn from_goals(goals: &[Goal], active: &[&Goal], top_n: usize) -> Self {
        let mut by_horizon: BTreeMap<Horizon, usize> =
            Horizon::ALL.into_iter().map(|h| (h, 0)).collect();
        let mut by_status: BTreeMap<GoalStatus, usize> =
            GoalStatus::ALL.into_iter().map(|s| (s, 0)).collect();

        for goal in goals {
            *by_horizon.entry(goal.horizon).or_default() += 1;
            *by_status.entry(goal.status).or_default() += 1;
        }

        let total = goals.len();
        let completed = by_status
            .get(&GoalStatus::Completed)
            .copied()
            .unwrap_or_default();
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f32 / total as f32
        };

        Self {
            total,
            by_horizon,
            by_status,
            top_active: active.iter().take(top_n).map(|g| (*g).clone()).collect(),
            completion_rate,
        }
    }

    pub fn count_for_horizon(&self, horizon: Horizon) -> usize {
        self.by_horizon.get(&horizon).copied().unwrap_or_default()
    }

    pub fn count_for_status(&self, status: GoalStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or_default()
    }
}
