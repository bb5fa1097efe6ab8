//! Snapshots - the full registry state as a serializable value.
//!
//! The registry never decides where or when state is stored. Callers take a
//! [`RegistrySnapshot`], write it wherever they like, and hand it back to
//! [`GoalRegistry::restore`] later.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use motive_model::{ActorId, Clock, Goal, GoalError};

use super::{ActorGoals, DependencyEdge, GoalRegistry};
use crate::config::RegistryConfig;

/// One actor's goals (all fields) and dependency edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActorSnapshot {
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

/// Every actor's goal set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RegistrySnapshot {
    pub actors: BTreeMap<ActorId, ActorSnapshot>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> Result<String, GoalError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, GoalError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn goal_count(&self) -> usize {
        self.actors.values().map(|a| a.goals.len()).sum()
    }
}

impl GoalRegistry {
    /// Capture the complete state of every actor.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let actors = self
            .actors
            .iter()
            .map(|(actor, set)| {
                (
                    actor.clone(),
                    ActorSnapshot {
                        goals: set.goals.clone(),
                        dependencies: set.graph.edges(),
                    },
                )
            })
            .collect();
        RegistrySnapshot { actors }
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// The snapshot is checked before anything is built: goal ids must be
    /// unique per actor, goals must be well formed, and dependency edges must
    /// join two of the actor's goals without forming a cycle.
    pub fn restore(
        snapshot: RegistrySnapshot,
        clock: Arc<dyn Clock>,
        config: RegistryConfig,
    ) -> Result<Self, GoalError> {
        let mut registry = Self::with_config(clock, config);
        let goals = snapshot.goal_count();

        for (actor, actor_snapshot) in snapshot.actors {
            let set = build_actor(&actor, actor_snapshot).inspect_err(|e| {
                warn!(actor = %actor, "rejected snapshot: {}", e);
            })?;
            registry.actors.insert(actor, set);
        }

        let dependencies: usize = registry
            .actors
            .values()
            .map(|set| set.graph.edge_count())
            .sum();
        info!(
            actors = registry.actors.len(),
            goals,
            dependencies,
            "goal registry restored from snapshot"
        );
        Ok(registry)
    }
}

fn build_actor(actor: &ActorId, snapshot: ActorSnapshot) -> Result<ActorGoals, GoalError> {
    let mut set = ActorGoals::default();
    let mut seen = HashSet::new();

    for goal in snapshot.goals {
        if !seen.insert(goal.id) {
            return Err(GoalError::invalid(format!(
                "duplicate goal id {} for actor {}",
                goal.id, actor
            )));
        }
        check_goal(&goal)?;
        set.push(goal);
    }

    for edge in snapshot.dependencies {
        for id in [edge.parent, edge.child] {
            if !set.contains(id) {
                return Err(GoalError::invalid(format!(
                    "dependency references unknown goal {} for actor {}",
                    id, actor
                )));
            }
        }
        if set.graph.would_create_cycle(edge.parent, edge.child) {
            return Err(GoalError::DependencyCycle {
                actor: actor.clone(),
                parent: edge.parent,
                child: edge.child,
            });
        }
        set.graph.add_edge(edge.parent, edge.child);
    }

    Ok(set)
}

fn check_goal(goal: &Goal) -> Result<(), GoalError> {
    if goal.description.trim().is_empty() {
        return Err(GoalError::invalid(format!(
            "goal {} has an empty description",
            goal.id
        )));
    }
    if !(0.0..=1.0).contains(&goal.progress) {
        return Err(GoalError::invalid(format!(
            "goal {} has progress {} outside [0, 1]",
            goal.id, goal.progress
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use motive_model::{GoalId, GoalStatus, Horizon, ManualClock, NewGoal, Priority};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 7, 1, 18, 0, 0).unwrap(),
        ))
    }

    fn populated() -> (GoalRegistry, ActorId, GoalId, GoalId) {
        let mut registry = GoalRegistry::new(clock());
        let actor = ActorId::from("Village chief");
        let parent = registry
            .add_goal(
                &actor,
                NewGoal::new("Keep the village safe", Horizon::Long)
                    .with_priority(Priority::High)
                    .with_deadline("before winter")
                    .with_sub_goal("repair the wall"),
                None,
            )
            .unwrap();
        let child = registry
            .add_goal(&actor, NewGoal::new("Recruit guards", Horizon::Short), Some(parent))
            .unwrap();
        registry.update_progress(&actor, parent, 0.6, Some("wall half repaired"));
        registry.add_blocker(&actor, child, "no coin");
        (registry, actor, parent, child)
    }

    #[test]
    fn test_snapshot_restores_exactly() {
        let (registry, actor, parent, child) = populated();
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.goal_count(), 2);

        let json = snapshot.to_json().unwrap();
        let restored = GoalRegistry::restore(
            RegistrySnapshot::from_json(&json).unwrap(),
            clock(),
            RegistryConfig::default(),
        )
        .unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.goals(&actor), registry.goals(&actor));
        assert!(restored.is_blocked(&actor, child));
        assert_eq!(restored.dependents(&actor, parent), &[child]);
    }

    #[test]
    fn test_restored_registry_keeps_cascading() {
        let (registry, actor, parent, child) = populated();
        let mut restored =
            GoalRegistry::restore(registry.snapshot(), clock(), RegistryConfig::default()).unwrap();

        restored.complete_goal(&actor, parent, None);
        assert_eq!(
            restored.get_goal(&actor, child).unwrap().status,
            GoalStatus::InProgress
        );
    }

    #[test]
    fn test_restore_rejects_dangling_edge() {
        let (registry, actor, parent, _) = populated();
        let mut snapshot = registry.snapshot();
        snapshot
            .actors
            .get_mut(&actor)
            .unwrap()
            .dependencies
            .push(DependencyEdge::new(parent, GoalId::new()));

        let result = GoalRegistry::restore(snapshot, clock(), RegistryConfig::default());
        assert!(matches!(result, Err(GoalError::InvalidInput(_))));
    }

    #[test]
    fn test_restore_rejects_cycle() {
        let (registry, actor, parent, child) = populated();
        let mut snapshot = registry.snapshot();
        snapshot
            .actors
            .get_mut(&actor)
            .unwrap()
            .dependencies
            .push(DependencyEdge::new(child, parent));

        let result = GoalRegistry::restore(snapshot, clock(), RegistryConfig::default());
        assert!(matches!(result, Err(GoalError::DependencyCycle { .. })));
    }

    #[test]
    fn test_restore_rejects_bad_goals() {
        let (registry, actor, _, _) = populated();

        let mut duplicated = registry.snapshot();
        let goals = &mut duplicated.actors.get_mut(&actor).unwrap().goals;
        let first = goals[0].clone();
        goals.push(first);
        assert!(GoalRegistry::restore(duplicated, clock(), RegistryConfig::default()).is_err());

        let mut out_of_range = registry.snapshot();
        out_of_range.actors.get_mut(&actor).unwrap().goals[0].progress = 1.5;
        assert!(GoalRegistry::restore(out_of_range, clock(), RegistryConfig::default()).is_err());
    }

    #[test]
    fn test_from_json_rejects_invalid_enum() {
        let json = r#"{"actors":{"Merchant":{"goals":[{
            "id":"00000000-0000-0000-0000-000000000001",
            "description":"Trade",
            "horizon":"forever",
            "priority":"normal",
            "status":"pending",
            "progress":0.0,
            "created_at":"2024-01-01T00:00:00Z",
            "updated_at":"2024-01-01T00:00:00Z",
            "completed_at":null
        }]}}}"#;
        let result = RegistrySnapshot::from_json(json);
        assert!(matches!(result, Err(GoalError::Serialization(_))));
    }

    #[test]
    fn test_empty_snapshot() {
        let registry = GoalRegistry::new(clock());
        let snapshot = registry.snapshot();
        assert_eq!(snapshot, RegistrySnapshot::default());
        assert!(snapshot.to_json().unwrap().contains("actors"));
    }
}
