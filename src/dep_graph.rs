//! A small `petgraph`-backed adjacency structure shared by the Graph
//! Builder, Topological Sorter, Cycle Classifier and Linearizer.
//!
//! Nodes are looked up by value rather than by [`NodeIndex`]: an index map
//! alongside the `petgraph::Graph` keeps lookups by package name O(1).
//!
//! An edge `from -> to` means "`from` depends on `to`" (`to` must be built
//! or installed first), matching the direction used throughout the source
//! algorithms this crate is modeled on.
use std::collections::HashMap;
use std::hash::Hash;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

#[derive(Debug, Clone)]
pub struct DepGraph<N> {
    graph: DiGraph<N, ()>,
    index: HashMap<N, NodeIndex>,
}

impl<N> Default for DepGraph<N>
where
    N: Clone + Eq + Hash,
{
    fn default() -> Self {
        DepGraph {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }
}

impl<N> DepGraph<N>
where
    N: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_node(&mut self, node: &N) -> NodeIndex {
        if let Some(index) = self.index.get(node) {
            return *index;
        }
        let index = self.graph.add_node(node.clone());
        self.index.insert(node.clone(), index);
        index
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    pub fn add_edge(&mut self, from: &N, to: &N) {
        let from = self.get_or_insert_node(from);
        let to = self.get_or_insert_node(to);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.index.keys()
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Nodes `node` directly depends on.
    pub fn dependencies_of(&self, node: &N) -> Vec<N> {
        let Some(&index) = self.index.get(node) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(index, Direction::Outgoing)
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Nodes that directly depend on `node`.
    pub fn dependents_of(&self, node: &N) -> Vec<N> {
        let Some(&index) = self.index.get(node) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// All nodes reachable from `start`, not including `start` itself,
    /// following dependency edges (depth-first).
    pub fn reachable_from(&self, start: &N) -> Vec<N>
    where
        N: Ord,
    {
        let mut seen = std::collections::HashSet::new();
        let mut stack = self.dependencies_of(start);
        while let Some(node) = stack.pop() {
            if seen.insert(node.clone()) {
                stack.extend(self.dependencies_of(&node));
            }
        }
        let mut result: Vec<_> = seen.into_iter().collect();
        result.sort();
        result
    }
}
