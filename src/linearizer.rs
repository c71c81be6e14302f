//! Interleaves each base's build-time sort list into a single global build
//! order that also respects run-time availability, treating cyclic run-time
//! groups as one co-built unit.
use std::collections::{HashMap, HashSet};

use crate::cycle_classifier::CycleClassification;
use crate::graph_builder::{BuildDependencyGraph, RunTimeDependencyGraph};
use crate::topo_sort::topo_sort;
use crate::{Pkgbase, Pkgname, Result, SchedulerError};

pub type SortedBuildDependencyGraph = HashMap<Pkgbase, Vec<Pkgbase>>;

/// The topological order of the transitive build-time closure of each base,
/// terminating with that base itself. A non-empty residue for any base is a
/// fatal circular dependency in the build-time graph.
pub fn sorted_build_dependency_graph(
    build_dep: &BuildDependencyGraph,
) -> Result<SortedBuildDependencyGraph> {
    let mut bases: Vec<Pkgbase> = build_dep.nodes().cloned().collect();
    bases.sort();

    let mut sorted = HashMap::new();
    for base in bases {
        let (ordered, residue) = topo_sort(build_dep, Some(&base));
        if residue.node_count() > 0 {
            let mut stuck: Vec<Pkgbase> = residue.nodes().cloned().collect();
            stuck.sort();
            return Err(SchedulerError::BuildTimeCircularDependency(stuck));
        }
        sorted.insert(base, ordered);
    }
    Ok(sorted)
}

/// The run-time closure of `rpm` (including `rpm`), mapped through
/// [`base_of`] and expanded via `sorted_build_dep` — i.e. every base needed
/// to build every rpm needed to run `rpm`. First-occurrence order preserved.
///
/// `run_dep`'s edges are already the transitive-all variant (the
/// `requires()` capability this crate consumes returns full closures, not
/// just direct dependencies), so a single hop over `run_dep` already
/// reaches the whole run-time closure.
fn sort_list_for_rpm(
    rpm: &Pkgname,
    run_dep: &RunTimeDependencyGraph,
    sorted_build_dep: &SortedBuildDependencyGraph,
    base_of: &HashMap<Pkgname, Pkgbase>,
) -> Vec<Pkgbase> {
    let mut runtime_closure: Vec<Pkgname> = run_dep.dependencies_of(rpm);
    runtime_closure.sort();
    runtime_closure.push(rpm.clone());

    let mut sort_list = Vec::new();
    let mut seen = HashSet::new();
    for r in runtime_closure {
        let Some(base) = base_of.get(&r) else {
            continue;
        };
        let Some(build_order) = sorted_build_dep.get(base) else {
            continue;
        };
        for b in build_order {
            if seen.insert(b.clone()) {
                sort_list.push(b.clone());
            }
        }
    }
    sort_list
}

fn apply_cycle_peer_filter(
    rpm: &Pkgname,
    sort_list: Vec<Pkgbase>,
    classification: &CycleClassification,
    already_placed: &HashSet<Pkgbase>,
    base_of: &HashMap<Pkgname, Pkgbase>,
) -> Vec<Pkgbase> {
    let Some(cycle_id) = classification.package_to_cycle.get(rpm) else {
        return sort_list;
    };
    let peer_bases: HashSet<Pkgbase> = classification.cycles_to_packages[cycle_id]
        .iter()
        .filter(|peer| *peer != rpm)
        .filter_map(|peer| base_of.get(peer).cloned())
        .collect();

    sort_list
        .into_iter()
        .filter(|base| !(peer_bases.contains(base) && already_placed.contains(base)))
        .collect()
}

fn dedupe_preserve_first_occurrence(list: &mut Vec<Pkgbase>) {
    let mut seen = HashSet::new();
    list.retain(|base| seen.insert(base.clone()));
}

/// Assembles the global build order. `base_of` maps each rpm to its base
/// package, as produced alongside the dependency graphs by
/// [`crate::graph_builder::build_graphs`].
pub fn linearize(
    build_dep: &BuildDependencyGraph,
    run_dep: &RunTimeDependencyGraph,
    sorted_build_dep: &SortedBuildDependencyGraph,
    base_of: &HashMap<Pkgname, Pkgbase>,
    classification: &CycleClassification,
) -> Vec<Pkgbase> {
    let mut remaining: std::collections::BTreeSet<Pkgbase> =
        build_dep.nodes().cloned().collect();
    let mut sorted_list: Vec<Pkgbase> = Vec::new();
    let mut growth_since_dedupe = 0usize;

    while let Some(current) = remaining.iter().next().cloned() {
        let scan_hit = sorted_list.iter().position(|b| remaining.contains(b));
        let (pkg, insertion_point) = match scan_hit {
            Some(idx) => (sorted_list[idx].clone(), idx),
            None => (current, sorted_list.len()),
        };

        let rpm = Pkgname::from(pkg.as_ref());
        let sort_list = sort_list_for_rpm(&rpm, run_dep, sorted_build_dep, base_of);
        let already_placed: HashSet<Pkgbase> =
            sorted_list[..insertion_point].iter().cloned().collect();
        let sort_list =
            apply_cycle_peer_filter(&rpm, sort_list, classification, &already_placed, base_of);

        let mut cursor = insertion_point;
        let mut placed = already_placed;
        for base in sort_list {
            if placed.contains(&base) {
                continue;
            }
            sorted_list.insert(cursor, base.clone());
            placed.insert(base);
            cursor += 1;
            growth_since_dedupe += 1;
        }

        remaining.remove(&pkg);

        if growth_since_dedupe > 100 {
            dedupe_preserve_first_occurrence(&mut sorted_list);
            growth_since_dedupe = 0;
        }
    }

    dedupe_preserve_first_occurrence(&mut sorted_list);
    sorted_list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle_classifier::CycleClassifier;
    use crate::graph_builder::build_graphs;
    use crate::spec_provider::StaticSpecProvider;

    fn linearize_for(provider: &StaticSpecProvider, roots: &[&str]) -> Vec<Pkgbase> {
        let roots: Vec<Pkgbase> = roots.iter().map(|r| Pkgbase::from(*r)).collect();
        let (build_dep, run_dep) = build_graphs(&roots, provider, false).unwrap();
        let sorted_build_dep = sorted_build_dependency_graph(&build_dep).unwrap();
        let (_, residue) = topo_sort(&run_dep, None);
        let mut classifier = CycleClassifier::new();
        let classification = classifier.classify(&residue);

        let mut base_of = HashMap::new();
        for rpm in run_dep.nodes() {
            base_of.insert(rpm.clone(), provider.base_pkg(rpm).unwrap());
        }

        linearize(&build_dep, &run_dep, &sorted_build_dep, &base_of, &classification)
    }

    #[test]
    fn linear_chain_scenario_2() {
        let provider = StaticSpecProvider::builder()
            .package("a", ["b"], [])
            .package("b", ["c"], [])
            .package("c", [], [])
            .build();

        let result = linearize_for(&provider, &["a"]);
        assert_eq!(
            result,
            vec![Pkgbase::from("c"), Pkgbase::from("b"), Pkgbase::from("a")]
        );
    }

    #[test]
    fn diamond_scenario_3() {
        let provider = StaticSpecProvider::builder()
            .package("a", ["b", "c"], [])
            .package("b", ["d"], [])
            .package("c", ["d"], [])
            .package("d", [], [])
            .build();

        let result = linearize_for(&provider, &["a"]);
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], Pkgbase::from("d"));
        assert_eq!(result[3], Pkgbase::from("a"));
        assert!(result.contains(&Pkgbase::from("b")));
        assert!(result.contains(&Pkgbase::from("c")));
    }

    #[test]
    fn runtime_cycle_both_bases_present_scenario_4() {
        let provider = StaticSpecProvider::builder()
            .package("libx", [], ["liby"])
            .package("liby", [], ["libx"])
            .build();

        let result = linearize_for(&provider, &["libx", "liby"]);
        assert_eq!(result.len(), 2);
        assert!(result.contains(&Pkgbase::from("libx")));
        assert!(result.contains(&Pkgbase::from("liby")));
    }

    #[test]
    fn linearizer_terminates_and_contains_no_duplicates() {
        // A slightly wider graph to stress the assembly loop beyond a
        // handful of bases.
        let provider = StaticSpecProvider::builder()
            .package("a", ["b", "c", "d"], [])
            .package("b", ["e"], [])
            .package("c", ["e"], [])
            .package("d", ["e"], [])
            .package("e", [], [])
            .build();

        let result = linearize_for(&provider, &["a"]);
        let mut seen = HashSet::new();
        for base in &result {
            assert!(seen.insert(base.clone()), "duplicate entry: {base}");
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(result.last(), Some(&Pkgbase::from("a")));
    }
}
