//! Tracks pending/building/done/failed state for one coordinator run behind
//! a single lock. All operations are CPU-only and synchronous: callers must
//! never `.await` while holding the guard this module hands back.
use std::collections::HashSet;
use std::sync::Mutex;

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::warn;

use crate::graph_builder::BuildDependencyGraph;
use crate::{Pkgbase, SchedulerError};

/// One of the four states a base moves through during a coordinator run.
/// Kept as its own enum (rather than matching on which `SchedulerSets`
/// field a base sits in) so [`Scheduler::state_counts`] can iterate the
/// whole state space without the four fields drifting out of sync with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum PackageState {
    Pending,
    Building,
    Done,
    Failed,
}

#[derive(Debug)]
struct SchedulerSets {
    pending: Vec<Pkgbase>,
    building: HashSet<Pkgbase>,
    done: HashSet<Pkgbase>,
    failed: HashSet<Pkgbase>,
}

/// Owns the four-set state machine plus the immutable build graph it
/// consults to decide eligibility. `build_dep` and the initial order are
/// fixed at construction; only the four sets mutate afterward.
#[derive(Debug)]
pub struct Scheduler {
    build_dep: BuildDependencyGraph,
    sets: Mutex<SchedulerSets>,
}

impl Scheduler {
    /// `global_sorted_list` seeds `pending` in build order; this is the
    /// order `next_package` prefers among equally-eligible candidates.
    pub fn new(global_sorted_list: Vec<Pkgbase>, build_dep: BuildDependencyGraph) -> Self {
        Scheduler {
            build_dep,
            sets: Mutex::new(SchedulerSets {
                pending: global_sorted_list,
                building: HashSet::new(),
                done: HashSet::new(),
                failed: HashSet::new(),
            }),
        }
    }

    fn is_eligible(&self, base: &Pkgbase, sets: &SchedulerSets) -> bool {
        self.build_dep
            .dependencies_of(base)
            .iter()
            .all(|dep| sets.done.contains(dep))
    }

    /// Finds the first pending base whose build-time dependencies are all
    /// done, moves it to `building`, and returns it. `None` does not imply
    /// completion — see [`Self::is_complete`].
    pub fn next_package(&self) -> Option<Pkgbase> {
        let mut sets = self.sets.lock().expect("scheduler mutex poisoned");
        let index = sets
            .pending
            .iter()
            .position(|base| self.is_eligible(base, &sets))?;
        let base = sets.pending.remove(index);
        sets.building.insert(base.clone());
        Some(base)
    }

    pub fn notify_success(&self, base: &Pkgbase) {
        let mut sets = self.sets.lock().expect("scheduler mutex poisoned");
        sets.building.remove(base);
        sets.done.insert(base.clone());
    }

    /// Moves `base` from `building` to `failed`, then sweeps `pending` to
    /// fixpoint: any base whose build-time deps intersect `failed` is
    /// tainted transitively, since it can never become eligible.
    pub fn notify_failure(&self, base: &Pkgbase) {
        let mut sets = self.sets.lock().expect("scheduler mutex poisoned");
        sets.building.remove(base);
        sets.failed.insert(base.clone());
        warn!(package = %base, "{}", SchedulerError::BuildFailure(base.clone()));

        loop {
            let tainted: Vec<Pkgbase> = sets
                .pending
                .iter()
                .filter(|p| {
                    self.build_dep
                        .dependencies_of(p)
                        .iter()
                        .any(|dep| sets.failed.contains(dep))
                })
                .cloned()
                .collect();
            if tainted.is_empty() {
                break;
            }
            sets.pending.retain(|p| !tainted.contains(p));
            sets.failed.extend(tainted);
        }
    }

    /// `building` and `pending` are both empty. Does not distinguish a
    /// clean finish from one where everything pending got tainted.
    pub fn is_complete(&self) -> bool {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        sets.pending.is_empty() && sets.building.is_empty()
    }

    /// True only at the very start, for an empty target set: nothing
    /// pending, nothing building, nothing failed yet.
    pub fn is_done_all(&self) -> bool {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        sets.pending.is_empty() && sets.building.is_empty() && sets.failed.is_empty()
    }

    pub fn done_list(&self) -> Vec<Pkgbase> {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        let mut done: Vec<Pkgbase> = sets.done.iter().cloned().collect();
        done.sort();
        done
    }

    pub fn failed_list(&self) -> Vec<Pkgbase> {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        let mut failed: Vec<Pkgbase> = sets.failed.iter().cloned().collect();
        failed.sort();
        failed
    }

    /// Logs a [`SchedulerError::StuckQueue`] diagnostic when pending is
    /// non-empty, nothing is building, and nothing pending is eligible —
    /// distinct from a normal completion, where pending is empty outright.
    pub fn log_if_stuck(&self) {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        if sets.building.is_empty()
            && !sets.pending.is_empty()
            && !sets.pending.iter().any(|base| self.is_eligible(base, &sets))
        {
            warn!("{}", SchedulerError::StuckQueue(sets.pending.len()));
        }
    }

    /// Exit code per the coordinator driver's contract: 1 if any failure
    /// was recorded, 0 otherwise. Only meaningful once `is_complete()`.
    pub fn exit_code(&self) -> i32 {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        if sets.failed.is_empty() {
            0
        } else {
            1
        }
    }

    /// Count of bases in each [`PackageState`], in declaration order.
    /// Used for the completion-summary log line rather than for any
    /// control-flow decision.
    pub fn state_counts(&self) -> Vec<(PackageState, usize)> {
        let sets = self.sets.lock().expect("scheduler mutex poisoned");
        PackageState::iter()
            .map(|state| {
                let count = match state {
                    PackageState::Pending => sets.pending.len(),
                    PackageState::Building => sets.building.len(),
                    PackageState::Done => sets.done.len(),
                    PackageState::Failed => sets.failed.len(),
                };
                (state, count)
            })
            .collect()
    }

    /// Renders [`Self::state_counts`] as `"Pending=0, Building=0, Done=3,
    /// Failed=1"`, logged once the run is complete.
    pub fn summary_line(&self) -> String {
        self.state_counts()
            .into_iter()
            .map(|(state, count)| format!("{state}={count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dep_graph::DepGraph;

    fn chain_graph() -> (BuildDependencyGraph, Vec<Pkgbase>) {
        // a depends on b, b depends on c
        let mut graph = DepGraph::new();
        graph.add_edge(&Pkgbase::from("a"), &Pkgbase::from("b"));
        graph.add_edge(&Pkgbase::from("b"), &Pkgbase::from("c"));
        let order = vec![Pkgbase::from("c"), Pkgbase::from("b"), Pkgbase::from("a")];
        (graph, order)
    }

    #[test]
    fn next_package_respects_dependency_order() {
        let (graph, order) = chain_graph();
        let scheduler = Scheduler::new(order, graph);

        assert_eq!(scheduler.next_package(), Some(Pkgbase::from("c")));
        assert_eq!(scheduler.next_package(), None);

        scheduler.notify_success(&Pkgbase::from("c"));
        assert_eq!(scheduler.next_package(), Some(Pkgbase::from("b")));

        scheduler.notify_success(&Pkgbase::from("b"));
        assert_eq!(scheduler.next_package(), Some(Pkgbase::from("a")));

        scheduler.notify_success(&Pkgbase::from("a"));
        assert!(scheduler.is_complete());
        assert_eq!(scheduler.exit_code(), 0);
    }

    #[test]
    fn failure_taints_transitive_dependents() {
        let (graph, order) = chain_graph();
        let scheduler = Scheduler::new(order, graph);

        scheduler.next_package(); // c -> building
        scheduler.notify_failure(&Pkgbase::from("c"));

        assert!(scheduler.is_complete());
        assert_eq!(
            scheduler.failed_list(),
            vec![Pkgbase::from("a"), Pkgbase::from("b"), Pkgbase::from("c")]
        );
        assert_eq!(scheduler.exit_code(), 1);
    }

    #[test]
    fn empty_target_set_is_done_all_up_front() {
        let scheduler = Scheduler::new(Vec::new(), DepGraph::new());
        assert!(scheduler.is_done_all());
        assert!(scheduler.is_complete());
    }

    #[test]
    fn state_counts_cover_all_four_states_in_order() {
        let (graph, order) = chain_graph();
        let scheduler = Scheduler::new(order, graph);

        scheduler.next_package(); // c -> building
        let counts = scheduler.state_counts();
        assert_eq!(
            counts,
            vec![
                (PackageState::Pending, 2),
                (PackageState::Building, 1),
                (PackageState::Done, 0),
                (PackageState::Failed, 0),
            ]
        );
        assert_eq!(scheduler.summary_line(), "Pending=2, Building=1, Done=0, Failed=0");
    }

    #[test]
    fn done_and_failed_never_double_count_a_base() {
        let (graph, order) = chain_graph();
        let scheduler = Scheduler::new(order, graph);

        scheduler.next_package();
        scheduler.notify_success(&Pkgbase::from("c"));
        scheduler.next_package();
        scheduler.notify_failure(&Pkgbase::from("b"));

        let done: HashSet<_> = scheduler.done_list().into_iter().collect();
        let failed: HashSet<_> = scheduler.failed_list().into_iter().collect();
        assert!(done.is_disjoint(&failed));
    }
}
