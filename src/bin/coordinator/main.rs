use std::collections::HashMap;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::Notify;

use buildsched::cycle_classifier::CycleClassifier;
use buildsched::dispatch_server::{AppState, build_router};
use buildsched::graph_builder::build_graphs;
use buildsched::linearizer::{linearize, sorted_build_dependency_graph};
use buildsched::scheduler::Scheduler;
use buildsched::spec_provider::{SpecProvider, StaticSpecProvider};
use buildsched::topo_sort::topo_sort;
use buildsched::{Constants, Pkgbase};

mod args;

use args::Args;

/// A small built-in fixture standing in for a real spec-file-backed
/// provider; parsing actual spec files is out of scope for this core.
fn demo_provider() -> StaticSpecProvider {
    StaticSpecProvider::builder()
        .package("glibc", [], [])
        .package("binutils", ["glibc"], ["glibc"])
        .package("gcc", ["binutils", "glibc"], ["binutils", "glibc"])
        .package("make", ["gcc"], ["gcc"])
        .build()
}

fn log_level_name(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    buildsched::tracing_setup::init(args.verbose + 1);
    tracing::debug!(?args, "starting coordinator");

    let provider = demo_provider();
    let roots: Vec<Pkgbase> = args.roots.iter().map(|r| Pkgbase::from(r.as_str())).collect();

    let (build_dep, run_dep) = match build_graphs(&roots, &provider, args.check_build_requires) {
        Ok(graphs) => graphs,
        Err(err) => {
            tracing::error!("{err}");
            return Ok(ExitCode::from(2));
        }
    };

    let sorted_build_dep = match sorted_build_dependency_graph(&build_dep) {
        Ok(sorted) => sorted,
        Err(err) => {
            tracing::error!("{err}");
            return Ok(ExitCode::from(2));
        }
    };

    let (_, run_residue) = topo_sort(&run_dep, None);
    let mut classifier = CycleClassifier::new();
    let classification = classifier.classify(&run_residue);

    let mut base_of = HashMap::new();
    for rpm in run_dep.nodes() {
        match provider.base_pkg(rpm) {
            Ok(base) => {
                base_of.insert(rpm.clone(), base);
            }
            Err(err) => {
                tracing::error!("{err}");
                return Ok(ExitCode::from(2));
            }
        }
    }

    let global_sorted_list =
        linearize(&build_dep, &run_dep, &sorted_build_dep, &base_of, &classification);
    tracing::info!(count = global_sorted_list.len(), "computed global build order");

    let scheduler = Arc::new(Scheduler::new(global_sorted_list, build_dep));

    if scheduler.is_done_all() {
        tracing::info!("nothing to build, exiting");
        return Ok(ExitCode::from(0));
    }

    let constants = Arc::new(Constants {
        build_arch: "x86_64".to_string(),
        check_build_requires: args.check_build_requires,
        spec_path: "<built-in demo fixture>".to_string(),
        log_level: log_level_name(args.verbose).to_string(),
    });

    let shutdown = Arc::new(Notify::new());
    let state = AppState {
        scheduler: scheduler.clone(),
        package_to_cycle: Arc::new(classification.package_to_cycle.clone()),
        constants,
        shutdown: shutdown.clone(),
    };

    let addr = SocketAddr::from((args.interface, args.port));
    let tcp_listener = std::net::TcpListener::bind(addr)?;
    tcp_listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(tcp_listener)?;

    tracing::info!(%addr, "coordinator listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.notified().await })
        .await?;

    Ok(ExitCode::from(scheduler.exit_code() as u8))
}
