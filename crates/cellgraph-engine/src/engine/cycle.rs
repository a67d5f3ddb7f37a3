//! Recalculation ordering with circular dependency detection.
//!
//! When a cell changes, every cell that transitively depends on it must be
//! recomputed, each one after everything it reads from. [`cells_to_recalculate`]
//! produces that order with a depth-first post-order walk over dependents, and
//! fails if the walk ever leads back to the changed cell (e.g. A1 references
//! B1, B1 references C1, C1 references A1).

use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use super::deps::DependencyView;

/// The changed cell transitively depends on itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("circular dependency: {}", path.join(" -> "))]
pub struct CycleError {
    /// The cycle, starting and ending at the changed cell.
    pub path: Vec<String>,
}

struct Frame {
    name: String,
    /// Dependents not yet visited, reversed so `pop` yields them in order.
    pending: Vec<String>,
}

impl Frame {
    fn new<V: DependencyView + ?Sized>(view: &V, name: String) -> Frame {
        let mut pending = view.direct_dependents(&name);
        pending.reverse();
        Frame { name, pending }
    }
}

/// Order in which `name` and everything depending on it must be recomputed.
///
/// `name` comes first, and every other cell appears after all cells it
/// depends on. Each cell appears once, even when reachable along several
/// paths.
pub fn cells_to_recalculate<V>(view: &V, name: &str) -> Result<Vec<String>, CycleError>
where
    V: DependencyView + ?Sized,
{
    let mut order = VecDeque::new();
    let mut visited = HashSet::new();
    visited.insert(name.to_string());
    let mut stack = vec![Frame::new(view, name.to_string())];

    while let Some(frame) = stack.last_mut() {
        let Some(next) = frame.pending.pop() else {
            if let Some(done) = stack.pop() {
                order.push_front(done.name);
            }
            continue;
        };

        if next == name {
            let mut path: Vec<String> = stack.iter().map(|f| f.name.clone()).collect();
            path.push(next);
            return Err(CycleError { path });
        }
        if visited.insert(next.clone()) {
            stack.push(Frame::new(view, next));
        }
    }

    tracing::trace!(start = name, ?order, "recalculation order");
    Ok(order.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::deps::{DependencyGraph, StagedDependees};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_isolated_cell() {
        let g = DependencyGraph::new();
        assert_eq!(cells_to_recalculate(&g, "A1").unwrap(), vec!["A1"]);
    }

    #[test]
    fn test_chain_order() {
        // B1 = A1 * 2, C1 = B1 * A1
        let mut g = DependencyGraph::new();
        g.add_dependency("A1", "B1");
        g.add_dependency("A1", "C1");
        g.add_dependency("B1", "C1");

        let order = cells_to_recalculate(&g, "A1").unwrap();
        assert_eq!(order, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_diamond_visits_each_cell_once() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("a", "c");
        g.add_dependency("b", "d");
        g.add_dependency("c", "d");
        g.add_dependency("d", "e");

        let order = cells_to_recalculate(&g, "a").unwrap();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], "a");
        assert!(position(&order, "b") < position(&order, "d"));
        assert!(position(&order, "c") < position(&order, "d"));
        assert!(position(&order, "d") < position(&order, "e"));
    }

    #[test]
    fn test_only_reachable_cells() {
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("x", "y");
        assert_eq!(cells_to_recalculate(&g, "b").unwrap(), vec!["b"]);
    }

    #[test]
    fn test_cycle_reports_path() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A1", "B1");
        g.add_dependency("B1", "C1");
        g.add_dependency("C1", "A1");

        let err = cells_to_recalculate(&g, "A1").unwrap_err();
        assert_eq!(err.path, vec!["A1", "B1", "C1", "A1"]);
        assert_eq!(err.to_string(), "circular dependency: A1 -> B1 -> C1 -> A1");
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A1", "A1");
        let err = cells_to_recalculate(&g, "A1").unwrap_err();
        assert_eq!(err.path, vec!["A1", "A1"]);
    }

    #[test]
    fn test_cycle_not_through_start_is_ignored() {
        // b and c form a loop that never returns to a.
        let mut g = DependencyGraph::new();
        g.add_dependency("a", "b");
        g.add_dependency("b", "c");
        g.add_dependency("c", "b");
        let order = cells_to_recalculate(&g, "a").unwrap();
        assert_eq!(order[0], "a");
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut g = DependencyGraph::new();
        for i in 0..50_000 {
            g.add_dependency(&format!("c{i}"), &format!("c{}", i + 1));
        }
        let order = cells_to_recalculate(&g, "c0").unwrap();
        assert_eq!(order.len(), 50_001);
        assert_eq!(order[0], "c0");
        assert_eq!(order[50_000], "c50000");
    }

    #[test]
    fn test_staged_view_detects_cycle_without_mutation() {
        // A1 = B1, B1 = C1; staging C1 = A1 closes the loop.
        let mut g = DependencyGraph::new();
        g.add_dependency("B1", "A1");
        g.add_dependency("C1", "B1");

        let staged = BTreeSet::from(["A1".to_string()]);
        let view = StagedDependees::new(&g, "C1", &staged);
        assert!(cells_to_recalculate(&view, "C1").is_err());
        assert_eq!(g.len(), 2);
        assert_eq!(cells_to_recalculate(&g, "C1").unwrap(), vec!["C1", "B1", "A1"]);
    }
}
