use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;

use buildsched::{Constants, CycleId, DoneList, Pkgname};

mod args;

use args::{Args, Command};

async fn donelist(server_url: &str) -> Result<()> {
    let body: DoneList = reqwest::get(format!("{server_url}/donelist/"))
        .await
        .context("failed to reach coordinator")?
        .json()
        .await
        .context("failed to parse donelist response")?;

    for package in body.packages {
        println!("{package}");
    }
    Ok(())
}

async fn cycles(server_url: &str) -> Result<()> {
    let body: HashMap<Pkgname, CycleId> = reqwest::get(format!("{server_url}/mappackagetocycle/"))
        .await
        .context("failed to reach coordinator")?
        .json()
        .await
        .context("failed to parse mappackagetocycle response")?;

    let mut entries: Vec<_> = body.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
    for (package, cycle_id) in entries {
        println!("{package}\t{cycle_id}");
    }
    Ok(())
}

async fn constants(server_url: &str) -> Result<()> {
    let body: Constants = reqwest::get(format!("{server_url}/constants/"))
        .await
        .context("failed to reach coordinator")?
        .json()
        .await
        .context("failed to parse constants response")?;

    println!("{body:#?}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    buildsched::tracing_setup::init(args.verbose + 1);
    tracing::debug!(?args, "starting client");

    match args.command {
        Command::Donelist => donelist(&args.server_url).await,
        Command::Cycles => cycles(&args.server_url).await,
        Command::Constants => constants(&args.server_url).await,
    }
}
