//! Goal categories: time horizon, priority and lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GoalError;

/// Intended time-scale of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Immediate action, hours to days.
    Short,
    /// A stage of a plan, weeks to months.
    Medium,
    /// An ultimate aim that may span the whole story.
    Long,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Short, Horizon::Medium, Horizon::Long];

    /// Sort rank; shorter horizons come first.
    pub fn rank(&self) -> u8 {
        match self {
            Horizon::Short => 0,
            Horizon::Medium => 1,
            Horizon::Long => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Short => "short",
            Horizon::Medium => "medium",
            Horizon::Long => "long",
        }
    }
}

/// How urgently a goal needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Must be handled now.
    Critical,
    /// Important but can wait a little.
    High,
    #[default]
    Normal,
    /// Can be postponed.
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Normal,
        Priority::Low,
    ];

    /// Sort rank; lower is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Normal => 2,
            Priority::Low => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

/// Lifecycle status of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Pending,
    InProgress,
    /// Temporarily set aside.
    Paused,
    Completed,
    /// Cannot be achieved.
    Failed,
    /// Given up by choice.
    Abandoned,
}

impl GoalStatus {
    pub const ALL: [GoalStatus; 6] = [
        GoalStatus::Pending,
        GoalStatus::InProgress,
        GoalStatus::Paused,
        GoalStatus::Completed,
        GoalStatus::Failed,
        GoalStatus::Abandoned,
    ];

    /// Completed, Failed and Abandoned end a goal's life.
    pub fn is_terminal(&self) -> bool {
        match self {
            GoalStatus::Completed | GoalStatus::Failed | GoalStatus::Abandoned => true,
            GoalStatus::Pending | GoalStatus::InProgress | GoalStatus::Paused => false,
        }
    }

    /// Statuses eligible for active-goal selection.
    pub fn is_actionable(&self) -> bool {
        match self {
            GoalStatus::Pending | GoalStatus::InProgress => true,
            GoalStatus::Paused
            | GoalStatus::Completed
            | GoalStatus::Failed
            | GoalStatus::Abandoned => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Paused => "paused",
            GoalStatus::Completed => "completed",
            GoalStatus::Failed => "failed",
            GoalStatus::Abandoned => "abandoned",
        }
    }
}

macro_rules! category_text {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = GoalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
                <$ty>::ALL
                    .into_iter()
                    .find(|value| value.as_str() == wanted)
                    .ok_or_else(|| GoalError::invalid(format!("unknown {}: {:?}", $label, s)))
            }
        }
    };
}

category_text!(Horizon, "horizon");
category_text!(Priority, "priority");
category_text!(GoalStatus, "status");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_order_urgent_first() {
        assert!(Priority::Critical.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Normal.rank());
        assert!(Priority::Normal.rank() < Priority::Low.rank());
        assert!(Horizon::Short.rank() < Horizon::Medium.rank());
        assert!(Horizon::Medium.rank() < Horizon::Long.rank());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(GoalStatus::Completed.is_terminal());
        assert!(GoalStatus::Failed.is_terminal());
        assert!(GoalStatus::Abandoned.is_terminal());
        assert!(!GoalStatus::Paused.is_terminal());
        assert!(GoalStatus::Pending.is_actionable());
        assert!(GoalStatus::InProgress.is_actionable());
        assert!(!GoalStatus::Paused.is_actionable());
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!("short".parse::<Horizon>().unwrap(), Horizon::Short);
        assert_eq!("Critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("in-progress".parse::<GoalStatus>().unwrap(), GoalStatus::InProgress);
        assert_eq!(" in progress ".parse::<GoalStatus>().unwrap(), GoalStatus::InProgress);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        let err = "someday".parse::<Horizon>().unwrap_err();
        assert!(matches!(err, GoalError::InvalidInput(ref msg) if msg.contains("horizon")));
        assert!("urgent".parse::<Priority>().is_err());
        assert!("".parse::<GoalStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&GoalStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let back: GoalStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GoalStatus::InProgress);
        assert_eq!(GoalStatus::InProgress.to_string(), "in_progress");
    }
}
