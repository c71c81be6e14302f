use std::net::IpAddr;

use clap::Parser;

/// Checks whether an interface is valid, i.e. it can be parsed into an IP address.
fn parse_interface(src: &str) -> Result<IpAddr, std::net::AddrParseError> {
    src.parse::<IpAddr>()
}

#[derive(Debug, Clone, Parser)]
#[command(name = "buildsched coordinator", author, about, version)]
pub struct Args {
    /// Be verbose. Provide once for "debug", twice for "trace".
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Interface to bind to.
    #[arg(
        short,
        long,
        value_parser(parse_interface),
        number_of_values = 1,
        default_value = "0.0.0.0"
    )]
    pub interface: IpAddr,

    /// Port on which to listen.
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Base packages to resolve the build-time and run-time closure from.
    /// An empty set is valid: the coordinator resolves an empty graph and
    /// exits immediately without binding a port.
    #[arg(long = "root", required = false, num_args = 0..)]
    pub roots: Vec<String>,

    /// Union `check_build_requires` results into each base's build-time edges.
    #[arg(long, default_value = "false")]
    pub check_build_requires: bool,
}
