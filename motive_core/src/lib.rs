//! # Motive Core
//!
//! Tracks what every actor in a story world wants. Goals are organized by
//! horizon and priority, may depend on each other, and are selected for
//! attention in a deterministic order.
//!
//! ## Core Components
//!
//! - **registry**: owns goals per actor, runs the status machine and
//!   completion cascade, answers active-goal queries, takes snapshots
//! - **reporting**: summaries and planning briefs for narration collaborators
//! - **config**: reporting limits loaded from TOML
//!
//! ## Design Philosophy
//!
//! - **Explicit state**: a registry is a value built from a clock, a config and
//!   optionally a snapshot; nothing is global
//! - **Live dependency state**: whether a goal is blocked is derived from its
//!   parents' current status on every query
//! - **Storage-agnostic**: snapshots are plain serde values; callers choose
//!   where they go

pub mod config;
pub mod registry;
pub mod reporting;

pub use config::*;
pub use registry::*;
pub use reporting::*;

pub use motive_model::{
    ActorId, Clock, Goal, GoalError, GoalId, GoalStatus, Horizon, ManualClock, NewGoal, Note,
    Priority, SystemClock,
};
