//! Error types shared by the goal model and the registry.

use thiserror::Error;

use crate::goal::{ActorId, GoalId};

/// Errors that can occur while building, mutating or restoring goals.
#[derive(Debug, Error)]
pub enum GoalError {
    /// The actor is known but has no goal with this id.
    #[error("goal {goal_id} not found for actor {actor}")]
    NotFound { actor: ActorId, goal_id: GoalId },

    /// No goal set has been created for this actor.
    #[error("unknown actor: {0}")]
    UnknownActor(ActorId),

    /// Malformed input: empty description, unknown category name, bad snapshot.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Adding the edge would make the actor's dependency graph cyclic.
    #[error("dependency {parent} -> {child} would create a cycle for actor {actor}")]
    DependencyCycle {
        actor: ActorId,
        parent: GoalId,
        child: GoalId,
    },

    /// Failed to serialize/deserialize goal data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to parse registry configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl GoalError {
    /// Shorthand for an [`GoalError::InvalidInput`] with a formatted message.
    pub fn invalid(message: impl Into<String>) -> Self {
        GoalError::InvalidInput(message.into())
    }

    /// Whether this error means "the thing asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, GoalError::NotFound { .. } | GoalError::UnknownActor(_))
    }
}
