use std::fmt;

use serde::{Deserialize, Serialize};

pub mod cycle_classifier;
pub mod dep_graph;
pub mod dispatch_server;
pub mod error;
pub mod graph_builder;
pub mod linearizer;
pub mod scheduler;
pub mod spec_provider;
pub mod topo_sort;
pub mod tracing_setup;

pub use error::{Result, SchedulerError};

/// The spec-level identity of a package. Several RPM names may share one base.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Pkgbase(String);

impl fmt::Display for Pkgbase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Pkgbase {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pkgbase {
    fn from(value: &str) -> Self {
        Pkgbase(value.to_string())
    }
}

impl From<String> for Pkgbase {
    fn from(value: String) -> Self {
        Pkgbase(value)
    }
}

/// A single installable RPM artifact, e.g. `glibc-devel`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Pkgname(String);

impl fmt::Display for Pkgname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Pkgname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pkgname {
    fn from(value: &str) -> Self {
        Pkgname(value.to_string())
    }
}

impl From<String> for Pkgname {
    fn from(value: String) -> Self {
        Pkgname(value)
    }
}

/// Opaque label `"cycle<N>"` for a strongly connected group of run-time
/// dependent RPMs that must be co-built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CycleId(String);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CycleId {
    fn from_index(index: usize) -> Self {
        CycleId(format!("cycle{index}"))
    }
}

/// Configuration knobs surfaced to workers and operators via `/constants/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Constants {
    pub build_arch: String,
    pub check_build_requires: bool,
    pub spec_path: String,
    pub log_level: String,
}

impl Default for Constants {
    fn default() -> Self {
        Constants {
            build_arch: "x86_64".to_string(),
            check_build_requires: false,
            spec_path: "./SPECS".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Body sent by a worker to `POST /notifybuild/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotifyBuild {
    pub package: Pkgbase,
    pub status: i32,
}

/// Body returned by `GET /donelist/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DoneList {
    pub packages: Vec<Pkgbase>,
}
