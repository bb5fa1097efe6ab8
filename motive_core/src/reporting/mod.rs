//! Reporting - read-only views of an actor's goals for planning collaborators.
//!
//! The planning brief mirrors how a narrator thinks about a character:
//! 1. **Short term**: what the actor can act on now, with its obstacles
//! 2. **Medium term**: the first few stage goals
//! 3. **Long term**: the first few ultimate aims
//! 4. **Completion rate** across everything the actor has pursued

mod summary;

pub use summary::*;

use serde::{Deserialize, Serialize};

use motive_model::{ActorId, Goal, Horizon, Priority};

use crate::registry::GoalRegistry;

/// Line rendered for an actor without goals.
pub const NO_GOALS_LINE: &str = "No clear goals at the moment";

/// One goal as shown in a brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefLine {
    pub description: String,
    pub priority: Priority,
    pub progress_percent: u32,
    pub blockers: Vec<String>,
}

impl From<&Goal> for BriefLine {
    fn from(goal: &Goal) -> Self {
        Self {
            description: goal.description.clone(),
            priority: goal.priority,
            progress_percent: goal.progress_percent(),
            blockers: goal.blockers.clone(),
        }
    }
}

/// The goals of one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefSection {
    pub horizon: Horizon,
    pub lines: Vec<BriefLine>,
}

/// Planning context for one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningBrief {
    pub actor: ActorId,
    pub total: usize,

    /// Only horizons the actor has goals for, shortest first.
    pub sections: Vec<BriefSection>,

    pub completion_rate: f32,
}

impl PlanningBrief {
    /// Assemble the brief from the registry's current state.
    ///
    /// Short-term lines are the active short-term goals in selection order.
    /// Medium and long-term lines are the first goals of that horizon in
    /// registration order, capped by the registry configuration.
    pub fn build(registry: &GoalRegistry, actor: &ActorId) -> Self {
        let summary = registry.summary(actor);
        let config = registry.config();
        let mut sections = Vec::new();

        for horizon in Horizon::ALL {
            let goals = registry.goals_by_horizon(actor, horizon, None);
            if goals.is_empty() {
                continue;
            }

            let lines = match horizon {
                Horizon::Short => registry
                    .active_goals(actor, false)
                    .into_iter()
                    .filter(|g| g.horizon == Horizon::Short)
                    .map(BriefLine::from)
                    .collect(),
                Horizon::Medium => take_lines(&goals, config.brief_medium_limit),
                Horizon::Long => take_lines(&goals, config.brief_long_limit),
            };
            sections.push(BriefSection { horizon, lines });
        }

        Self {
            actor: actor.clone(),
            total: summary.total,
            sections,
            completion_rate: summary.completion_rate,
        }
    }

    /// Format the brief as a prompt fragment.
    pub fn to_prompt_string(&self) -> String {
        if self.total == 0 {
            return NO_GOALS_LINE.to_string();
        }

        let mut prompt = String::new();

        for section in &self.sections {
            prompt.push_str(&format!("## {}\n", section_title(section.horizon)));
            for line in &section.lines {
                prompt.push_str(&format!(
                    "- {} ({}, progress {}%)\n",
                    line.description, line.priority, line.progress_percent
                ));
                if !line.blockers.is_empty() {
                    prompt.push_str(&format!("  Blockers: {}\n", line.blockers.join(", ")));
                }
            }
        }

        prompt.push_str(&format!(
            "Completion rate: {:.1}%",
            self.completion_rate * 100.0
        ));
        prompt
    }
}

fn take_lines(goals: &[&Goal], limit: usize) -> Vec<BriefLine> {
    goals.iter().take(limit).map(|g| BriefLine::from(*g)).collect()
}

fn section_title(horizon: Horizon) -> &'static str {
    match horizon {
        Horizon::Short => "Short-term goals",
        Horizon::Medium => "Medium-term goals",
        Horizon::Long => "Long-term goals",
    }
}
