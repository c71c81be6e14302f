//! Kahn-style topological sort, returning both the ordered prefix and
//! whatever strongly-connected residue is left over. Run-time dependency
//! graphs are expected to leave residue (handed to the [`crate::cycle_classifier`]);
//! a non-empty residue from the build-time graph is a fatal
//! [`SchedulerError::BuildTimeCircularDependency`].
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use crate::dep_graph::DepGraph;

/// Returns `(ordered, residue)`. `ordered` lists dependencies before their
/// dependents. `residue` contains only the nodes (and edges between them)
/// that could not be ordered because they participate in a cycle.
///
/// Ties among equally-ready nodes are broken lexicographically so dispatch
/// sequences and test fixtures are reproducible, rather than left to
/// whatever order an unordered set happens to iterate in.
pub fn topo_sort<N>(graph: &DepGraph<N>, start_node: Option<&N>) -> (Vec<N>, DepGraph<N>)
where
    N: Clone + Eq + Hash + Ord,
{
    let working_set: HashSet<N> = match start_node {
        Some(start) => {
            let mut set: HashSet<N> = graph.reachable_from(start).into_iter().collect();
            set.insert(start.clone());
            set
        }
        None => graph.nodes().cloned().collect(),
    };

    let mut remaining_deps: std::collections::HashMap<N, usize> = working_set
        .iter()
        .map(|n| {
            let count = graph
                .dependencies_of(n)
                .into_iter()
                .filter(|dep| working_set.contains(dep))
                .count();
            (n.clone(), count)
        })
        .collect();

    let mut ready: VecDeque<N> = next_ready(&remaining_deps);
    let mut ordered = Vec::new();

    while let Some(node) = pop_lowest(&mut ready) {
        ordered.push(node.clone());
        remaining_deps.remove(&node);

        let mut newly_ready = Vec::new();
        for dependent in graph.dependents_of(&node) {
            if !working_set.contains(&dependent) {
                continue;
            }
            if let Some(count) = remaining_deps.get_mut(&dependent) {
                *count -= 1;
                if *count == 0 {
                    newly_ready.push(dependent);
                }
            }
        }
        newly_ready.sort();
        ready.extend(newly_ready);
    }

    let mut residue = DepGraph::new();
    for node in remaining_deps.keys() {
        residue.get_or_insert_node(node);
        for dep in graph.dependencies_of(node) {
            if remaining_deps.contains_key(&dep) {
                residue.add_edge(node, &dep);
            }
        }
    }

    (ordered, residue)
}

fn next_ready<N: Clone + Ord>(remaining_deps: &std::collections::HashMap<N, usize>) -> VecDeque<N> {
    let mut ready: Vec<N> = remaining_deps
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(n, _)| n.clone())
        .collect();
    ready.sort();
    ready.into()
}

fn pop_lowest<N: Ord>(ready: &mut VecDeque<N>) -> Option<N> {
    ready.pop_front()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![("a", "b"), ("b", "c")], vec!["c", "b", "a"])]
    #[case(vec![("x", "y")], vec!["y", "x"])]
    #[case(vec![("p", "q"), ("p", "r")], vec!["q", "r", "p"])]
    fn acyclic_graphs_sort_with_empty_residue(
        #[case] edges: Vec<(&str, &str)>,
        #[case] expected: Vec<&str>,
    ) {
        let mut graph = DepGraph::new();
        for (from, to) in edges {
            graph.add_edge(&from, &to);
        }
        let (ordered, residue) = topo_sort(&graph, None);
        assert_eq!(ordered, expected);
        assert_eq!(residue.node_count(), 0);
    }

    #[test]
    fn linear_chain_orders_dependency_before_dependent() {
        let mut graph = DepGraph::new();
        graph.add_edge(&"a", &"b");
        graph.add_edge(&"b", &"c");
        let (ordered, residue) = topo_sort(&graph, None);
        assert_eq!(ordered, vec!["c", "b", "a"]);
        assert_eq!(residue.node_count(), 0);
    }

    #[test]
    fn diamond_places_shared_dependency_first() {
        let mut graph = DepGraph::new();
        graph.add_edge(&"a", &"b");
        graph.add_edge(&"a", &"c");
        graph.add_edge(&"b", &"d");
        graph.add_edge(&"c", &"d");
        let (ordered, residue) = topo_sort(&graph, None);
        assert_eq!(ordered[0], "d");
        assert_eq!(ordered[3], "a");
        assert_eq!(residue.node_count(), 0);
    }

    #[test]
    fn cycle_is_left_in_residue() {
        let mut graph = DepGraph::new();
        graph.add_edge(&"a", &"b");
        graph.add_edge(&"b", &"a");
        let (ordered, residue) = topo_sort(&graph, None);
        assert!(ordered.is_empty());
        assert_eq!(residue.node_count(), 2);
    }

    #[test]
    fn start_node_restricts_to_transitive_closure() {
        let mut graph = DepGraph::new();
        graph.add_edge(&"a", &"b");
        graph.add_edge(&"x", &"y");
        let (ordered, _) = topo_sort(&graph, Some(&"a"));
        assert_eq!(ordered, vec!["b", "a"]);
    }
}
