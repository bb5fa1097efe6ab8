//! The goal ("motivation") entity and its own state transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::{GoalId, Note};
use crate::categories::{GoalStatus, Horizon, Priority};
use crate::error::GoalError;

/// Audit text appended when a goal reaches full progress.
pub const GOAL_REACHED_NOTE: &str = "goal reached";

/// A single tracked objective belonging to one actor.
///
/// Goals are only ever created by the registry from a [`NewGoal`], which is
/// where the id and timestamps are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub description: String,
    pub horizon: Horizon,
    pub priority: Priority,
    pub status: GoalStatus,

    /// Progress from 0.0 to 1.0.
    pub progress: f32,

    /// Informational only; nothing enforces it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(default)]
    pub sub_goals: Vec<String>,

    /// Obstacles that are not other goals. Kept unique, in insertion order.
    #[serde(default)]
    pub blockers: Vec<String>,

    /// Goals of the same actor that must be Completed before this one is active.
    #[serde(default)]
    pub prerequisites: BTreeSet<GoalId>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Append-only audit log.
    #[serde(default)]
    pub notes: Vec<Note>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set the first time the goal becomes Completed and never cleared.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    /// Progress as a whole percentage, for display.
    pub fn progress_percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }

    /// Set progress (clamped to [0, 1]) and log it.
    ///
    /// Returns `true` when this call moved the goal to Completed.
    pub fn record_progress(&mut self, value: f32, note: Option<&str>, now: DateTime<Utc>) -> bool {
        // NaN carries no information; keep the previous value.
        if !value.is_nan() {
            self.progress = value.clamp(0.0, 1.0);
        }
        self.updated_at = now;

        let text = match note {
            Some(note) => note.to_string(),
            None => format!("progress set to {}%", self.progress_percent()),
        };
        self.notes.push(Note::new(now, text));

        if self.progress >= 1.0 && self.status != GoalStatus::Completed {
            self.status = GoalStatus::Completed;
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
            self.notes.push(Note::new(now, GOAL_REACHED_NOTE));
            return true;
        }
        false
    }

    /// Overwrite the status unconditionally and record `old → new[: reason]`.
    ///
    /// Returns the previous status.
    pub fn transition(
        &mut self,
        status: GoalStatus,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> GoalStatus {
        let old = self.status;
        self.status = status;
        self.updated_at = now;

        if status == GoalStatus::Completed && self.completed_at.is_none() {
            self.completed_at = Some(now);
            self.progress = 1.0;
        }

        let text = match reason {
            Some(reason) => format!("{} → {}: {}", old, status, reason),
            None => format!("{} → {}", old, status),
        };
        self.notes.push(Note::new(now, text));
        old
    }

    /// Returns `true` if the blocker was not already present.
    pub fn add_blocker(&mut self, blocker: &str, now: DateTime<Utc>) -> bool {
        if self.blockers.iter().any(|b| b == blocker) {
            return false;
        }
        self.blockers.push(blocker.to_string());
        self.updated_at = now;
        true
    }

    /// Returns `true` if the blocker was present.
    pub fn remove_blocker(&mut self, blocker: &str, now: DateTime<Utc>) -> bool {
        let before = self.blockers.len();
        self.blockers.retain(|b| b != blocker);
        if self.blockers.len() == before {
            return false;
        }
        self.updated_at = now;
        true
    }
}

/// Everything a caller supplies to create a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub description: String,
    pub horizon: Horizon,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub sub_goals: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub prerequisites: BTreeSet<GoalId>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewGoal {
    /// A Pending, Normal-priority goal with no progress.
    pub fn new(description: impl Into<String>, horizon: Horizon) -> Self {
        Self {
            description: description.into(),
            horizon,
            priority: Priority::default(),
            status: GoalStatus::default(),
            progress: 0.0,
            deadline: None,
            sub_goals: Vec::new(),
            blockers: Vec::new(),
            prerequisites: BTreeSet::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the starting progress, clamped to [0, 1].
    ///
    /// Full progress here does not complete the goal; only a later progress
    /// update on the registry does that.
    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn with_sub_goal(mut self, sub_goal: impl Into<String>) -> Self {
        self.sub_goals.push(sub_goal.into());
        self
    }

    pub fn with_blocker(mut self, blocker: impl Into<String>) -> Self {
        let blocker = blocker.into();
        if !self.blockers.contains(&blocker) {
            self.blockers.push(blocker);
        }
        self
    }

    pub fn with_prerequisite(mut self, id: GoalId) -> Self {
        self.prerequisites.insert(id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Reject inputs that cannot become a goal.
    pub fn validate(&self) -> Result<(), GoalError> {
        if self.description.trim().is_empty() {
            return Err(GoalError::invalid("goal description must not be empty"));
        }
        if !self.progress.is_finite() {
            return Err(GoalError::invalid("goal progress must be a finite number"));
        }
        Ok(())
    }

    /// Turn the draft into a goal with the given id and creation time.
    pub fn into_goal(self, id: GoalId, now: DateTime<Utc>) -> Result<Goal, GoalError> {
        self.validate()?;

        let mut blockers: Vec<String> = Vec::with_capacity(self.blockers.len());
        for blocker in self.blockers {
            if !blockers.contains(&blocker) {
                blockers.push(blocker);
            }
        }

        let progress = self.progress.clamp(0.0, 1.0);
        // A goal created as Completed counts as completed from its creation.
        let (progress, completed_at) = if self.status == GoalStatus::Completed {
            (1.0, Some(now))
        } else {
            (progress, None)
        };

        Ok(Goal {
            id,
            description: self.description,
            horizon: self.horizon,
            priority: self.priority,
            status: self.status,
            progress,
            deadline: self.deadline,
            sub_goals: self.sub_goals,
            blockers,
            prerequisites: self.prerequisites,
            metadata: self.metadata,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn make_goal() -> Goal {
        NewGoal::new("Talk to the village chief", Horizon::Short)
            .with_priority(Priority::High)
            .into_goal(GoalId::new(), t0())
            .unwrap()
    }

    #[test]
    fn test_new_goal_defaults() {
        let goal = make_goal();
        assert_eq!(goal.status, GoalStatus::Pending);
        assert_eq!(goal.priority, Priority::High);
        assert_eq!(goal.progress, 0.0);
        assert_eq!(goal.created_at, t0());
        assert_eq!(goal.updated_at, t0());
        assert!(goal.completed_at.is_none());
        assert!(goal.notes.is_empty());
    }

    #[test]
    fn test_empty_description_rejected() {
        let result = NewGoal::new("   ", Horizon::Long).into_goal(GoalId::new(), t0());
        assert!(matches!(result, Err(GoalError::InvalidInput(_))));
    }

    #[test]
    fn test_builder_clamps_and_dedups() {
        let draft = NewGoal::new("Collect rare goods", Horizon::Medium)
            .with_progress(3.0)
            .with_blocker("no money")
            .with_blocker("no money")
            .with_sub_goal("visit the market");
        assert_eq!(draft.progress, 1.0);
        assert_eq!(draft.blockers, vec!["no money".to_string()]);
        assert_eq!(draft.sub_goals.len(), 1);
    }

    #[test]
    fn test_created_completed_sets_completion_fields() {
        let goal = NewGoal::new("Explore the nearby village", Horizon::Short)
            .with_status(GoalStatus::Completed)
            .into_goal(GoalId::new(), t0())
            .unwrap();
        assert_eq!(goal.progress, 1.0);
        assert_eq!(goal.completed_at, Some(t0()));
    }

    #[test]
    fn test_full_starting_progress_does_not_complete() {
        let goal = NewGoal::new("Polish the sword", Horizon::Short)
            .with_progress(1.0)
            .into_goal(GoalId::new(), t0())
            .unwrap();
        assert_eq!(goal.progress, 1.0);
        assert_eq!(goal.status, GoalStatus::Pending);
        assert!(goal.completed_at.is_none());
    }

    #[test]
    fn test_record_progress_clamps() {
        let mut goal = make_goal();
        assert!(!goal.record_progress(-0.5, None, t0()));
        assert_eq!(goal.progress, 0.0);
        assert!(!goal.record_progress(f32::NAN, None, t0()));
        assert_eq!(goal.progress, 0.0);
        assert!(!goal.record_progress(0.4, Some("halfway there"), t0()));
        assert_eq!(goal.progress, 0.4);
        assert_eq!(goal.notes.last().unwrap().text, "halfway there");
        assert_eq!(goal.notes.len(), 3);
    }

    #[test]
    fn test_record_progress_completes_once() {
        let mut goal = make_goal();
        let first = t0() + Duration::minutes(5);
        assert!(goal.record_progress(7.0, None, first));
        assert_eq!(goal.status, GoalStatus::Completed);
        assert_eq!(goal.progress, 1.0);
        assert_eq!(goal.completed_at, Some(first));
        assert_eq!(goal.notes.last().unwrap().text, GOAL_REACHED_NOTE);

        let later = first + Duration::minutes(5);
        assert!(!goal.record_progress(1.0, None, later));
        assert_eq!(goal.completed_at, Some(first));
        assert_eq!(goal.updated_at, later);
    }

    #[test]
    fn test_transition_records_audit_note() {
        let mut goal = make_goal();
        let old = goal.transition(GoalStatus::Paused, Some("waiting for spring"), t0());
        assert_eq!(old, GoalStatus::Pending);
        assert_eq!(goal.notes[0].text, "pending → paused: waiting for spring");

        goal.transition(GoalStatus::InProgress, None, t0());
        assert_eq!(goal.notes[1].text, "paused → in_progress");
    }

    #[test]
    fn test_transition_to_completed_forces_progress() {
        let mut goal = make_goal();
        goal.transition(GoalStatus::Completed, None, t0());
        assert_eq!(goal.progress, 1.0);
        assert_eq!(goal.completed_at, Some(t0()));

        goal.transition(GoalStatus::Abandoned, None, t0());
        assert_eq!(goal.completed_at, Some(t0()));
    }

    #[test]
    fn test_blockers_are_idempotent() {
        let mut goal = make_goal();
        assert!(goal.add_blocker("the bridge is out", t0()));
        assert!(!goal.add_blocker("the bridge is out", t0()));
        assert_eq!(goal.blockers.len(), 1);
        assert!(goal.remove_blocker("the bridge is out", t0()));
        assert!(!goal.remove_blocker("the bridge is out", t0()));
        assert!(goal.blockers.is_empty());
        assert_eq!(goal.status, GoalStatus::Pending);
    }

    #[test]
    fn test_goal_serialization_round_trip() {
        let mut goal = make_goal();
        goal.record_progress(0.25, Some("first lead"), t0());
        goal.add_blocker("guards at the gate", t0());
        goal.metadata.insert("source".to_string(), serde_json::json!("npc_generator"));

        let json = serde_json::to_string_pretty(&goal).unwrap();
        let restored: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, goal);
        assert!(!json.contains("deadline"));
    }
}
