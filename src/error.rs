use thiserror::Error;

use crate::Pkgbase;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("unknown package: {0}")]
    UnknownPackage(Pkgbase),

    #[error("build-time circular dependency among: {0:?}")]
    BuildTimeCircularDependency(Vec<Pkgbase>),

    #[error("malformed notifybuild request: {0}")]
    DispatchProtocolError(&'static str),

    /// Not returned from any `Result` — raised only as a `tracing::warn!`
    /// event when a worker reports a failed build, so the taint sweep has a
    /// named thing to log.
    #[error("build failed: {0}")]
    BuildFailure(Pkgbase),

    /// Logged, not fatal: pending is non-empty, nothing is building, and
    /// nothing in pending is currently eligible. Treated as completion with
    /// residual failures rather than a hang.
    #[error("queue stuck with {0} package(s) blocked")]
    StuckQueue(usize),
}
