//! Walks [`SpecProvider`] metadata from a set of requested targets to
//! produce the build-time and run-time dependency graphs.
//!
//! Uses an explicit worklist rather than recursion: large package sets can
//! walk arbitrarily deep dependency chains, and an unbounded recursive
//! implementation (as the source has) risks blowing the stack.
use std::collections::{HashSet, VecDeque};

use crate::dep_graph::DepGraph;
use crate::spec_provider::SpecProvider;
use crate::{Pkgbase, Pkgname, Result};

pub type BuildDependencyGraph = DepGraph<Pkgbase>;
pub type RunTimeDependencyGraph = DepGraph<Pkgname>;

/// Walks the transitive build- and run-time closure of `roots`.
///
/// When `check_build_requires` is `true`, `check_build_requires(base,
/// highest_version(base))` results are unioned into each base's build-time
/// edge set, matching the source's "check mode".
pub fn build_graphs(
    roots: &[Pkgbase],
    provider: &dyn SpecProvider,
    check_build_requires: bool,
) -> Result<(BuildDependencyGraph, RunTimeDependencyGraph)> {
    let mut build_dep = BuildDependencyGraph::new();
    let mut run_dep = RunTimeDependencyGraph::new();

    let mut seen_build: HashSet<Pkgbase> = HashSet::new();
    let mut seen_run: HashSet<Pkgbase> = HashSet::new();
    let mut worklist: VecDeque<Pkgbase> = roots.iter().cloned().collect();

    while let Some(base) = worklist.pop_front() {
        let mut next_bases = Vec::new();

        if seen_build.insert(base.clone()) {
            let mut build_requires = provider.build_requires(&base)?;
            if check_build_requires {
                let version = provider.highest_version(&base)?;
                build_requires.extend(provider.check_build_requires(&base, &version)?);
            }
            for rpm in &build_requires {
                let dep_base = provider.base_pkg(rpm)?;
                build_dep.add_edge(&base, &dep_base);
                next_bases.push(dep_base);
            }
            build_dep.get_or_insert_node(&base);
        }

        if seen_run.insert(base.clone()) {
            for rpm in provider.sub_packages(&base)? {
                let requires = provider.requires(&rpm)?;
                run_dep.get_or_insert_node(&rpm);
                for dep_rpm in &requires {
                    run_dep.add_edge(&rpm, dep_rpm);
                    next_bases.push(provider.base_pkg(dep_rpm)?);
                }
            }
        }

        for next in next_bases {
            if !seen_build.contains(&next) || !seen_run.contains(&next) {
                worklist.push_back(next);
            }
        }
    }

    Ok((build_dep, run_dep))
}
