use std::time::Duration;

use clap::Parser;

fn parse_poll_interval(src: &str) -> Result<Duration, std::num::ParseIntError> {
    Ok(Duration::from_millis(src.parse::<u64>()?))
}

#[derive(Debug, Clone, Parser)]
#[command(name = "buildsched worker", author, about, version)]
pub struct Args {
    /// Be verbose. Provide once for "debug", twice for "trace".
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Base URL of the coordinator to poll.
    #[arg(long, env, default_value = "http://localhost:8080")]
    pub server_url: String,

    /// Milliseconds to wait between polls when nothing is eligible yet.
    #[arg(long, value_parser(parse_poll_interval), default_value = "1000")]
    pub poll_interval: Duration,
}
