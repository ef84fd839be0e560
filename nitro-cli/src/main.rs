//! Nitro: local development environments on Docker.
//!
//! # Usage
//!
//! ```text
//! nitro apply [--skip-hosts]
//! nitro hosts --hostnames a.nitro,b.nitro [--path <file>] [--address <ip>] [--dry-run]
//! nitro remove <hostname>
//! nitro status [--json]
//! ```

mod commands;
mod elevate;
mod reporter;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{apply::ApplyArgs, hosts::HostsArgs, remove::RemoveArgs, status::StatusArgs};

#[derive(Parser, Debug)]
#[command(
    name = "nitro",
    version,
    about = "Converge a local Docker development environment on nitro.yaml",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start or create every declared container, sync the proxy, remove
    /// orphans and update the hosts file.
    Apply(ApplyArgs),

    /// Write the managed block of a hosts file. Usually invoked by `apply`
    /// with elevated privileges.
    Hosts(HostsArgs),

    /// Remove a site from nitro.yaml. The next `apply` sweeps its container.
    Remove(RemoveArgs),

    /// List managed containers and whether the configuration declares them.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Apply(args) => runtime()?.block_on(args.run()),
        Commands::Hosts(args) => args.run(),
        Commands::Remove(args) => args.run(),
        Commands::Status(args) => runtime()?.block_on(args.run()),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
