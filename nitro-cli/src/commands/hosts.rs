//! `nitro hosts`: write the managed block of a hosts file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use nitro_core::paths::LOOPBACK;
use nitro_hosts::{default_path, write_hosts, HostsWrite};

/// Arguments for `nitro hosts`.
#[derive(Args, Debug)]
pub struct HostsArgs {
    /// Comma-separated hostnames to map.
    #[arg(long, value_delimiter = ',', required = true)]
    pub hostnames: Vec<String>,

    /// Hosts file to edit. Defaults to the system hosts file.
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Address the hostnames resolve to.
    #[arg(long, default_value = LOOPBACK)]
    pub address: String,

    /// Print the diff instead of writing.
    #[arg(long)]
    pub dry_run: bool,
}

impl HostsArgs {
    pub fn run(self) -> Result<()> {
        let path = self.path.unwrap_or_else(default_path);
        let hostnames: Vec<String> = self
            .hostnames
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();

        let result = write_hosts(&path, &self.address, &hostnames, self.dry_run)
            .with_context(|| format!("unable to update {}", path.display()))?;

        match result {
            HostsWrite::Unchanged { path } => {
                println!("✓ {} already up to date", path.display())
            }
            HostsWrite::Written { path } => {
                println!("✓ {} updated ({} hostnames)", path.display(), hostnames.len())
            }
            HostsWrite::WouldWrite { path, diff } => {
                println!("[dry-run] {} would change:", path.display());
                print!("{diff}");
            }
        }
        Ok(())
    }
}
