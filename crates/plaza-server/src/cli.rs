use std::path::PathBuf;

use clap::Parser;

/// Plaza: authoritative presence server for a shared 2D world.
#[derive(Parser, Debug)]
#[command(name = "plaza-server", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides the config file).
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind (overrides the config file).
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
