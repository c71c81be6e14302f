use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use buildsched::{NotifyBuild, Pkgbase};

mod args;

use args::Args;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stands in for invoking `rpmbuild`; the actual build invocation is out of
/// scope for this core (see the crate's `SpecProvider` boundary).
async fn simulate_build(package: &Pkgbase) -> bool {
    tracing::info!(%package, "building");
    true
}

async fn poll_once(client: &reqwest::Client, server_url: &str) -> Result<Option<Pkgbase>> {
    let response = client
        .get(format!("{server_url}/package/"))
        .send()
        .await
        .context("failed to reach coordinator")?;

    if response.status() == reqwest::StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = response
        .error_for_status()
        .context("coordinator returned an error")?
        .text()
        .await
        .context("failed to read response body")?;

    Ok(Some(Pkgbase::from(body)))
}

async fn report_result(
    client: &reqwest::Client,
    server_url: &str,
    package: Pkgbase,
    succeeded: bool,
) -> Result<()> {
    let notify = NotifyBuild {
        package,
        status: if succeeded { 0 } else { -1 },
    };

    client
        .post(format!("{server_url}/notifybuild/"))
        .json(&notify)
        .send()
        .await
        .context("failed to notify coordinator")?
        .error_for_status()
        .context("coordinator rejected the build notification")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    buildsched::tracing_setup::init(args.verbose + 1);
    tracing::debug!(?args, "starting worker");

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("failed to build http client")?;

    loop {
        match poll_once(&client, &args.server_url).await? {
            Some(package) => {
                let succeeded = simulate_build(&package).await;
                report_result(&client, &args.server_url, package, succeeded).await?;
            }
            None => {
                tracing::debug!("nothing eligible, sleeping");
                tokio::time::sleep(args.poll_interval).await;
            }
        }
    }
}
