//! Initializes the process-wide `tracing` subscriber shared by all three
//! binaries.
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber writing to stdout, filtered by
/// `RUST_LOG` if set, otherwise by `verbose`:
/// - 0: error
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4 or more: trace
pub fn init(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
