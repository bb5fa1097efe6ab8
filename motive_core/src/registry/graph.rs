//! Dependency graph - which goals wait on which, per actor.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use motive_model::GoalId;

/// A directed edge: `child` depends on `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub parent: GoalId,
    pub child: GoalId,
}

impl DependencyEdge {
    pub fn new(parent: GoalId, child: GoalId) -> Self {
        Self { parent, child }
    }
}

/// The dependency relation of one actor's goals.
///
/// Edges are the only stored fact. The two maps index the same edge set from
/// either end and are always updated together. Whether a goal is blocked is
/// never stored here; callers derive it from the parents' current status.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Index: parent -> goals that depend on it.
    dependents: HashMap<GoalId, Vec<GoalId>>,

    /// Index: child -> goals it depends on.
    dependencies: HashMap<GoalId, Vec<GoalId>>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `child` depends on `parent`.
    ///
    /// Returns `false` if the edge was already present. Acyclicity is the
    /// caller's job: check [`DependencyGraph::would_create_cycle`] first.
    pub fn add_edge(&mut self, parent: GoalId, child: GoalId) -> bool {
        if self.contains_edge(parent, child) {
            return false;
        }
        self.dependents.entry(parent).or_default().push(child);
        self.dependencies.entry(child).or_default().push(parent);
        true
    }

    pub fn contains_edge(&self, parent: GoalId, child: GoalId) -> bool {
        self.dependents_of(parent).contains(&child)
    }

    /// Goals that depend on `parent`, in the order the edges were added.
    pub fn dependents_of(&self, parent: GoalId) -> &[GoalId] {
        self.dependents.get(&parent).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Goals that `child` depends on, in the order the edges were added.
    pub fn dependencies_of(&self, child: GoalId) -> &[GoalId] {
        self.dependencies.get(&child).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether adding `parent -> child` would close a cycle.
    ///
    /// That happens exactly when `parent` is already reachable from `child`
    /// by following dependents (or when they are the same goal).
    pub fn would_create_cycle(&self, parent: GoalId, child: GoalId) -> bool {
        if parent == child {
            return true;
        }

        let mut visited: HashSet<GoalId> = HashSet::new();
        let mut stack = vec![child];
        while let Some(current) = stack.pop() {
            if current == parent {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.dependents_of(current).iter().copied());
        }
        false
    }

    /// All edges, sorted for stable output.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<_> = self
            .dependents
            .iter()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .map(move |child| DependencyEdge::new(*parent, *child))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Get the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_indexes_both_directions() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (GoalId::new(), GoalId::new());

        assert!(graph.add_edge(a, b));
        assert_eq!(graph.dependents_of(a), &[b]);
        assert_eq!(graph.dependencies_of(b), &[a]);
        assert!(graph.dependents_of(b).is_empty());
        assert!(graph.dependencies_of(a).is_empty());
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (GoalId::new(), GoalId::new());

        assert!(graph.add_edge(a, b));
        assert!(!graph.add_edge(a, b));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = DependencyGraph::new();
        let (a, b, c, d) = (GoalId::new(), GoalId::new(), GoalId::new(), GoalId::new());

        graph.add_edge(a, b);
        graph.add_edge(b, c);

        assert!(graph.would_create_cycle(c, a));
        assert!(graph.would_create_cycle(b, a));
        assert!(graph.would_create_cycle(a, a));
        assert!(!graph.would_create_cycle(a, c));
        assert!(!graph.would_create_cycle(d, a));
        assert!(!graph.would_create_cycle(c, d));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        let (a, b, c, d) = (GoalId::new(), GoalId::new(), GoalId::new(), GoalId::new());

        graph.add_edge(a, b);
        graph.add_edge(a, c);
        graph.add_edge(b, d);
        assert!(!graph.would_create_cycle(c, d));
        graph.add_edge(c, d);
        assert_eq!(graph.dependencies_of(d).len(), 2);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_edges_sorted() {
        let mut graph = DependencyGraph::new();
        assert_eq!(graph.edge_count(), 0);

        let (a, b, c) = (GoalId::new(), GoalId::new(), GoalId::new());
        graph.add_edge(a, b);
        graph.add_edge(c, b);
        graph.add_edge(a, c);

        let edges = graph.edges();
        assert_eq!(edges.len(), 3);
        assert!(edges.windows(2).all(|w| w[0] <= w[1]));
        assert!(edges.contains(&DependencyEdge::new(c, b)));
    }
}
