//! Groups the run-time topological sort's cyclic residue into named
//! strongly-connected groups.
//!
//! This is a two-pass mutual-reachability classifier, not a tight
//! (Tarjan/Kosaraju) SCC algorithm: for each unassigned node `n` it computes
//! everything reachable from `n` within the residue, then keeps only the
//! members that can also reach back to `n`. That isolates exactly the SCC
//! containing `n`; residue chains of several disjoint SCCs get separate
//! cycle ids, one per pass.
use std::collections::HashMap;

use crate::dep_graph::DepGraph;
use crate::{CycleId, Pkgname};

#[derive(Debug, Default, Clone)]
pub struct CycleClassification {
    pub cycles_to_packages: HashMap<CycleId, Vec<Pkgname>>,
    pub package_to_cycle: HashMap<Pkgname, CycleId>,
}

/// Counter is scoped to one classifier instance (one per coordinator run),
/// not a process-wide mutable static, so repeated runs in the same process
/// (e.g. tests) never leak cycle ids between each other.
#[derive(Debug, Default)]
pub struct CycleClassifier {
    next_cycle_index: usize,
}

impl CycleClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, residue: &DepGraph<Pkgname>) -> CycleClassification {
        let mut result = CycleClassification::default();

        let mut nodes: Vec<Pkgname> = residue.nodes().cloned().collect();
        nodes.sort();

        for node in &nodes {
            if result.package_to_cycle.contains_key(node) {
                continue;
            }

            let reach_n = residue.reachable_from(node);
            let mut members: Vec<Pkgname> = reach_n
                .into_iter()
                .filter(|m| residue.reachable_from(m).contains(node))
                .collect();

            if members.is_empty() {
                continue;
            }

            members.push(node.clone());
            members.sort();
            members.dedup();

            let cycle_id = CycleId::from_index(self.next_cycle_index);
            self.next_cycle_index += 1;

            for member in &members {
                result.package_to_cycle.insert(member.clone(), cycle_id.clone());
            }
            result.cycles_to_packages.insert(cycle_id, members);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![("a", "b"), ("b", "a")], 1)]
    #[case(vec![("a", "b"), ("b", "c"), ("c", "a")], 1)]
    #[case(vec![("a", "b"), ("b", "a"), ("x", "y"), ("y", "x")], 2)]
    fn residue_cycle_counts_match_expectation(
        #[case] edges: Vec<(&str, &str)>,
        #[case] expected_cycle_count: usize,
    ) {
        let mut residue = DepGraph::new();
        for (from, to) in edges {
            residue.add_edge(&Pkgname::from(from), &Pkgname::from(to));
        }
        let mut classifier = CycleClassifier::new();
        let classification = classifier.classify(&residue);
        assert_eq!(classification.cycles_to_packages.len(), expected_cycle_count);
    }

    #[test]
    fn two_node_cycle_is_classified() {
        let mut residue = DepGraph::new();
        residue.add_edge(&Pkgname::from("libx"), &Pkgname::from("liby"));
        residue.add_edge(&Pkgname::from("liby"), &Pkgname::from("libx"));

        let mut classifier = CycleClassifier::new();
        let classification = classifier.classify(&residue);

        assert_eq!(classification.cycles_to_packages.len(), 1);
        let (cycle_id, members) = classification.cycles_to_packages.iter().next().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(
            classification.package_to_cycle.get(&Pkgname::from("libx")),
            Some(cycle_id)
        );
        assert_eq!(
            classification.package_to_cycle.get(&Pkgname::from("liby")),
            Some(cycle_id)
        );
    }

    #[test]
    fn disjoint_cycles_get_separate_ids() {
        let mut residue = DepGraph::new();
        residue.add_edge(&Pkgname::from("a"), &Pkgname::from("b"));
        residue.add_edge(&Pkgname::from("b"), &Pkgname::from("a"));
        residue.add_edge(&Pkgname::from("x"), &Pkgname::from("y"));
        residue.add_edge(&Pkgname::from("y"), &Pkgname::from("x"));

        let mut classifier = CycleClassifier::new();
        let classification = classifier.classify(&residue);

        assert_eq!(classification.cycles_to_packages.len(), 2);
        assert_ne!(
            classification.package_to_cycle[&Pkgname::from("a")],
            classification.package_to_cycle[&Pkgname::from("x")]
        );
    }

    #[test]
    fn repeated_runs_do_not_reuse_ids() {
        let mut residue = DepGraph::new();
        residue.add_edge(&Pkgname::from("a"), &Pkgname::from("b"));
        residue.add_edge(&Pkgname::from("b"), &Pkgname::from("a"));

        let mut classifier = CycleClassifier::new();
        let first = classifier.classify(&residue);
        let second = classifier.classify(&residue);

        let first_id = first.package_to_cycle[&Pkgname::from("a")].clone();
        let second_id = second.package_to_cycle[&Pkgname::from("a")].clone();
        assert_ne!(first_id, second_id);
    }
}
