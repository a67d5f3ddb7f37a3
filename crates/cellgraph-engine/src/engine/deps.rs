//! Dependency graph between named cells.
//!
//! The graph is a set of ordered pairs `(s, t)` meaning "t depends on s":
//! `s` must be evaluated before `t`. For example, with the pairs
//! `{(a, b), (a, c), (b, d), (d, d)}`:
//!
//! ```text
//! dependents(a) = {b, c}     dependees(a) = {}
//! dependents(b) = {d}        dependees(b) = {a}
//! dependents(d) = {d}        dependees(d) = {b, d}
//! ```
//!
//! Both directions are indexed so either side can be queried or replaced in
//! one step. Unknown names behave like names with no pairs; nothing fails.

use std::collections::{BTreeSet, HashMap};

#[derive(Default, Debug, Clone)]
struct Node {
    /// Cells that depend on this one.
    dependents: BTreeSet<String>,
    /// Cells this one depends on.
    dependees: BTreeSet<String>,
}

impl Node {
    fn is_isolated(&self) -> bool {
        self.dependents.is_empty() && self.dependees.is_empty()
    }
}

/// A set of "t depends on s" pairs over cell names.
///
/// # Invariants
///
/// 1. `t ∈ nodes[s].dependents` iff `s ∈ nodes[t].dependees`.
/// 2. A name with no pairs has no node.
/// 3. `pairs` is the number of distinct `(s, t)` pairs.
#[derive(Default, Debug, Clone)]
pub struct DependencyGraph {
    nodes: HashMap<String, Node>,
    pairs: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ordered pairs.
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Whether `name` appears in any pair.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Cells that depend on `s`, in sorted order.
    pub fn dependents<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.nodes
            .get(s)
            .into_iter()
            .flat_map(|node| node.dependents.iter().map(String::as_str))
    }

    /// Cells that `s` depends on, in sorted order.
    pub fn dependees<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.nodes
            .get(s)
            .into_iter()
            .flat_map(|node| node.dependees.iter().map(String::as_str))
    }

    /// Number of cells that `s` depends on.
    pub fn num_dependees(&self, s: &str) -> usize {
        self.nodes.get(s).map_or(0, |node| node.dependees.len())
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.nodes.get(s).is_some_and(|node| !node.dependents.is_empty())
    }

    pub fn has_dependees(&self, s: &str) -> bool {
        self.nodes.get(s).is_some_and(|node| !node.dependees.is_empty())
    }

    /// Add the pair `(s, t)`: `t` depends on `s`. No-op if already present.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let inserted = self
            .nodes
            .entry(s.to_string())
            .or_default()
            .dependents
            .insert(t.to_string());
        if inserted {
            self.nodes
                .entry(t.to_string())
                .or_default()
                .dependees
                .insert(s.to_string());
            self.pairs += 1;
        }
    }

    /// Remove the pair `(s, t)` if present.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        let removed = self
            .nodes
            .get_mut(s)
            .is_some_and(|node| node.dependents.remove(t));
        if !removed {
            return;
        }
        if let Some(node) = self.nodes.get_mut(t) {
            node.dependees.remove(s);
        }
        self.pairs -= 1;
        self.prune(s);
        self.prune(t);
    }

    /// Replace every pair `(s, _)` with `(s, t)` for each `t` in `new_dependents`.
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependents(s).map(str::to_string).collect();
        for t in &old {
            self.remove_dependency(s, t);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every pair `(_, s)` with `(t, s)` for each `t` in `new_dependees`.
    pub fn replace_dependees<I, S>(&mut self, s: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependees(s).map(str::to_string).collect();
        for t in &old {
            self.remove_dependency(t, s);
        }
        for t in new_dependees {
            self.add_dependency(t.as_ref(), s);
        }
    }

    fn prune(&mut self, name: &str) {
        if self.nodes.get(name).is_some_and(Node::is_isolated) {
            self.nodes.remove(name);
        }
    }
}

/// Read access to "who depends on this cell", for recalculation ordering.
pub trait DependencyView {
    /// Cells that directly depend on `name`.
    fn direct_dependents(&self, name: &str) -> Vec<String>;
}

impl DependencyView for DependencyGraph {
    fn direct_dependents(&self, name: &str) -> Vec<String> {
        self.dependents(name).map(str::to_string).collect()
    }
}

/// A graph as it would look after replacing one cell's dependees.
///
/// Used to validate a formula change before anything is mutated: recalculation
/// ordering runs over the staged view, and the real graph is only updated once
/// the ordering succeeds.
#[derive(Debug, Clone, Copy)]
pub struct StagedDependees<'a> {
    graph: &'a DependencyGraph,
    cell: &'a str,
    dependees: &'a BTreeSet<String>,
}

impl<'a> StagedDependees<'a> {
    pub fn new(
        graph: &'a DependencyGraph,
        cell: &'a str,
        dependees: &'a BTreeSet<String>,
    ) -> StagedDependees<'a> {
        StagedDependees {
            graph,
            cell,
            dependees,
        }
    }
}

impl DependencyView for StagedDependees<'_> {
    fn direct_dependents(&self, name: &str) -> Vec<String> {
        // `cell` is among `name`'s committed dependents exactly when `name` is
        // one of its old dependees; drop that edge and add the staged one.
        let mut dependents: Vec<String> = self
            .graph
            .dependents(name)
            .filter(|d| *d != self.cell)
            .map(str::to_string)
            .collect();
        if self.dependees.contains(name) {
            dependents.push(self.cell.to_string());
        }
        dependents
    }
}
