//! Goal Registry - owns every actor's goals and the dependencies between them.
//!
//! The registry is a plain in-memory value. All mutation goes through
//! `&mut self`, so one call (including its completion cascade) is always one
//! atomic unit. Hosts that share a registry across threads wrap it in a
//! single `RwLock`; queries take `&self` and may run side by side.
//!
//! Active-goal selection:
//! 1. Keep goals that are Pending or InProgress
//! 2. Unless blocked goals are requested, drop goals with a dependency parent
//!    that is not Completed yet
//! 3. Drop goals with a prerequisite that is not Completed (always)
//! 4. Stable sort by (priority rank, horizon rank)

mod graph;
mod snapshot;

pub use graph::*;
pub use snapshot::*;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use motive_model::{
    ActorId, Clock, Goal, GoalError, GoalId, GoalStatus, Horizon, NewGoal, SystemClock,
};

use crate::config::RegistryConfig;
use crate::reporting::{GoalSummary, PlanningBrief};

/// Audit text recorded on dependents started by a completion cascade.
pub const PREREQUISITE_SATISFIED_NOTE: &str = "prerequisite satisfied";

/// One actor's goals in registration order, plus their dependency graph.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActorGoals {
    goals: Vec<Goal>,

    /// Index: goal id -> position in `goals`.
    positions: HashMap<GoalId, usize>,

    graph: DependencyGraph,
}

impl ActorGoals {
    fn get(&self, id: GoalId) -> Option<&Goal> {
        self.positions.get(&id).map(|&pos| &self.goals[pos])
    }

    fn get_mut(&mut self, id: GoalId) -> Option<&mut Goal> {
        self.positions.get(&id).map(|&pos| &mut self.goals[pos])
    }

    fn contains(&self, id: GoalId) -> bool {
        self.positions.contains_key(&id)
    }

    fn push(&mut self, goal: Goal) {
        self.positions.insert(goal.id, self.goals.len());
        self.goals.push(goal);
    }

    fn is_completed(&self, id: GoalId) -> bool {
        self.get(id).is_some_and(Goal::is_completed)
    }

    /// Blocked while any dependency parent is not Completed.
    fn is_blocked(&self, id: GoalId) -> bool {
        self.graph
            .dependencies_of(id)
            .iter()
            .any(|parent| !self.is_completed(*parent))
    }

    fn prerequisites_met(&self, goal: &Goal) -> bool {
        goal.prerequisites.iter().all(|id| self.is_completed(*id))
    }

    /// Start every Pending dependent of a completed goal. One level only.
    fn cascade_completion(&mut self, completed: GoalId, now: DateTime<Utc>) -> Vec<GoalId> {
        let children = self.graph.dependents_of(completed).to_vec();
        let mut started = Vec::new();

        for child in children {
            if let Some(goal) = self.get_mut(child) {
                if goal.status == GoalStatus::Pending {
                    goal.transition(
                        GoalStatus::InProgress,
                        Some(PREREQUISITE_SATISFIED_NOTE),
                        now,
                    );
                    started.push(child);
                }
            }
        }

        started
    }
}

/// The registry of all actors' goals.
pub struct GoalRegistry {
    actors: BTreeMap<ActorId, ActorGoals>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
}

impl Default for GoalRegistry {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for GoalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalRegistry")
            .field("actors", &self.actors)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GoalRegistry {
    /// Create an empty registry stamping goals with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, RegistryConfig::default())
    }

    /// Create an empty registry with custom configuration.
    pub fn with_config(clock: Arc<dyn Clock>, config: RegistryConfig) -> Self {
        Self {
            actors: BTreeMap::new(),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Make sure the actor has a (possibly empty) goal set.
    pub fn ensure_actor(&mut self, actor: &ActorId) {
        if !self.has_actor(actor) {
            self.actors.insert(actor.clone(), ActorGoals::default());
        }
    }

    /// All known actors, sorted.
    pub fn actors(&self) -> impl Iterator<Item = &ActorId> {
        self.actors.keys()
    }

    pub fn has_actor(&self, actor: &ActorId) -> bool {
        self.actors.contains_key(actor)
    }

    /// An actor's goals in registration order. Empty for unknown actors.
    pub fn goals(&self, actor: &ActorId) -> &[Goal] {
        self.actors
            .get(actor)
            .map(|set| set.goals.as_slice())
            .unwrap_or(&[])
    }

    /// Register a new goal, optionally depending on an existing one.
    ///
    /// Fails without touching the registry when the draft is invalid, when
    /// `depending_on` is not one of the actor's goals, or when a prerequisite
    /// id is unknown.
    pub fn add_goal(
        &mut self,
        actor: &ActorId,
        draft: NewGoal,
        depending_on: Option<GoalId>,
    ) -> Result<GoalId, GoalError> {
        if let Err(e) = draft.validate() {
            warn!(actor = %actor, "rejected goal: {}", e);
            return Err(e);
        }

        let existing = self.actors.get(actor);
        let known = |id: GoalId| existing.is_some_and(|set| set.contains(id));
        for id in depending_on.iter().chain(draft.prerequisites.iter()) {
            if !known(*id) {
                warn!(actor = %actor, goal_id = %id, "rejected goal: unknown dependency");
                return Err(GoalError::NotFound {
                    actor: actor.clone(),
                    goal_id: *id,
                });
            }
        }

        let id = GoalId::new();
        let goal = draft.into_goal(id, self.now())?;
        info!(
            actor = %actor,
            goal_id = %id,
            horizon = %goal.horizon,
            priority = %goal.priority,
            "goal added: {}",
            goal.description
        );

        self.ensure_actor(actor);
        let set = self
            .actors
            .get_mut(actor)
            .ok_or_else(|| GoalError::UnknownActor(actor.clone()))?;
        set.push(goal);
        if let Some(parent) = depending_on {
            // A brand-new goal has no dependents, so this edge cannot close a cycle.
            set.graph.add_edge(parent, id);
            debug!(actor = %actor, parent = %parent, child = %id, "dependency added");
        }

        Ok(id)
    }

    /// Make `child` depend on `parent`. Both must already belong to the actor.
    ///
    /// Returns `Ok(false)` if the edge already existed.
    pub fn add_dependency(
        &mut self,
        actor: &ActorId,
        parent: GoalId,
        child: GoalId,
    ) -> Result<bool, GoalError> {
        let set = self
            .actors
            .get_mut(actor)
            .ok_or_else(|| GoalError::UnknownActor(actor.clone()))?;

        for id in [parent, child] {
            if !set.contains(id) {
                return Err(GoalError::NotFound {
                    actor: actor.clone(),
                    goal_id: id,
                });
            }
        }

        if set.graph.contains_edge(parent, child) {
            return Ok(false);
        }
        if set.graph.would_create_cycle(parent, child) {
            warn!(actor = %actor, parent = %parent, child = %child, "rejected cyclic dependency");
            return Err(GoalError::DependencyCycle {
                actor: actor.clone(),
                parent,
                child,
            });
        }

        set.graph.add_edge(parent, child);
        debug!(actor = %actor, parent = %parent, child = %child, "dependency added");
        Ok(true)
    }

    /// Look up a goal. `None` if the actor or goal is unknown.
    pub fn get_goal(&self, actor: &ActorId, id: GoalId) -> Option<&Goal> {
        self.actors.get(actor)?.get(id)
    }

    /// Set a goal's progress (clamped to [0, 1]); completes and cascades at 1.0.
    ///
    /// Returns `false` if the goal does not exist.
    pub fn update_progress(
        &mut self,
        actor: &ActorId,
        id: GoalId,
        value: f32,
        note: Option<&str>,
    ) -> bool {
        let now = self.now();
        let Some(set) = self.actors.get_mut(actor) else {
            return false;
        };
        let Some(goal) = set.get_mut(id) else {
            return false;
        };

        let reached = goal.record_progress(value, note, now);
        debug!(actor = %actor, goal_id = %id, progress = goal.progress, "progress updated");

        // Only the call that moves the goal into Completed starts dependents.
        if reached {
            info!(actor = %actor, goal_id = %id, "goal completed: {}", goal.description);
            let started = set.cascade_completion(id, now);
            log_cascade(actor, id, &started);
        }
        true
    }

    /// Overwrite a goal's status, recording `old → new[: note]`.
    ///
    /// Completing a goal that was not Completed yet fills the completion
    /// fields once and runs the same cascade as progress completion.
    /// Returns `false` if not found.
    pub fn set_status(
        &mut self,
        actor: &ActorId,
        id: GoalId,
        status: GoalStatus,
        note: Option<&str>,
    ) -> bool {
        let now = self.now();
        let Some(set) = self.actors.get_mut(actor) else {
            return false;
        };
        let Some(goal) = set.get_mut(id) else {
            return false;
        };

        let old = goal.transition(status, note, now);
        debug!(actor = %actor, goal_id = %id, from = %old, to = %status, "status changed");

        if status == GoalStatus::Completed && old != GoalStatus::Completed {
            let started = set.cascade_completion(id, now);
            log_cascade(actor, id, &started);
        }
        true
    }

    /// Add a free-text blocker. Adding one twice is a no-op.
    pub fn add_blocker(&mut self, actor: &ActorId, id: GoalId, blocker: &str) -> bool {
        let now = self.now();
        match self.goal_mut(actor, id) {
            Some(goal) => {
                if goal.add_blocker(blocker, now) {
                    debug!(actor = %actor, goal_id = %id, blocker, "blocker added");
                }
                true
            }
            None => false,
        }
    }

    /// Remove a free-text blocker. Removing an absent one is a no-op.
    pub fn remove_blocker(&mut self, actor: &ActorId, id: GoalId, blocker: &str) -> bool {
        let now = self.now();
        match self.goal_mut(actor, id) {
            Some(goal) => {
                if goal.remove_blocker(blocker, now) {
                    debug!(actor = %actor, goal_id = %id, blocker, "blocker removed");
                }
                true
            }
            None => false,
        }
    }

    /// Shorthand for `update_progress(actor, id, 1.0, note)`.
    pub fn complete_goal(&mut self, actor: &ActorId, id: GoalId, note: Option<&str>) -> bool {
        self.update_progress(actor, id, 1.0, note)
    }

    /// Mark a goal Abandoned. It stays in the registry.
    pub fn abandon_goal(&mut self, actor: &ActorId, id: GoalId, reason: Option<&str>) -> bool {
        self.set_status(actor, id, GoalStatus::Abandoned, reason)
    }

    fn goal_mut(&mut self, actor: &ActorId, id: GoalId) -> Option<&mut Goal> {
        self.actors.get_mut(actor)?.get_mut(id)
    }

    /// Goals of one horizon, optionally of one status, in registration order.
    pub fn goals_by_horizon(
        &self,
        actor: &ActorId,
        horizon: Horizon,
        status: Option<GoalStatus>,
    ) -> Vec<&Goal> {
        self.goals(actor)
            .iter()
            .filter(|g| g.horizon == horizon)
            .filter(|g| status.map_or(true, |s| g.status == s))
            .collect()
    }

    /// The goals an actor can work on right now, most urgent first.
    ///
    /// Prerequisite filtering applies even when `include_blocked` is set.
    pub fn active_goals(&self, actor: &ActorId, include_blocked: bool) -> Vec<&Goal> {
        let Some(set) = self.actors.get(actor) else {
            return Vec::new();
        };

        let mut active: Vec<&Goal> = set
            .goals
            .iter()
            .filter(|g| g.status.is_actionable())
            .filter(|g| include_blocked || !set.is_blocked(g.id))
            .filter(|g| set.prerequisites_met(g))
            .collect();

        // `sort_by_key` is stable, so ties keep registration order.
        active.sort_by_key(|g| (g.priority.rank(), g.horizon.rank()));
        active
    }

    /// Whether a goal waits on a dependency that is not Completed.
    ///
    /// `false` for unknown goals.
    pub fn is_blocked(&self, actor: &ActorId, id: GoalId) -> bool {
        self.actors
            .get(actor)
            .is_some_and(|set| set.contains(id) && set.is_blocked(id))
    }

    /// Goals that depend on `id`.
    pub fn dependents(&self, actor: &ActorId, id: GoalId) -> &[GoalId] {
        self.actors
            .get(actor)
            .map(|set| set.graph.dependents_of(id))
            .unwrap_or(&[])
    }

    /// Goals that `id` depends on.
    pub fn dependencies(&self, actor: &ActorId, id: GoalId) -> &[GoalId] {
        self.actors
            .get(actor)
            .map(|set| set.graph.dependencies_of(id))
            .unwrap_or(&[])
    }

    /// Counts, top active goals and completion rate for one actor.
    pub fn summary(&self, actor: &ActorId) -> GoalSummary {
        if !self.has_actor(actor) {
            return GoalSummary::empty();
        }
        let active = self.active_goals(actor, false);
        GoalSummary::from_goals(self.goals(actor), &active, self.config.summary_top_active)
    }

    /// Planning view of one actor's goals, ready to render into a prompt.
    pub fn planning_brief(&self, actor: &ActorId) -> PlanningBrief {
        PlanningBrief::build(self, actor)
    }
}

fn log_cascade(actor: &ActorId, completed: GoalId, started: &[GoalId]) {
    if !started.is_empty() {
        debug!(
            actor = %actor,
            goal_id = %completed,
            started = started.len(),
            "completion cascade started dependents"
        );
    }
}
