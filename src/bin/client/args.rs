use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List packages successfully built so far
    Donelist,
    /// Show the mapping of packages to their cycle group, if any
    Cycles,
    /// Show the coordinator's configuration snapshot
    Constants,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "buildsched client", author, about, version)]
pub struct Args {
    /// Be verbose. Provide once for "debug", twice for "trace".
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the coordinator to query.
    #[arg(long, env, default_value = "http://localhost:8080")]
    pub server_url: String,
}
