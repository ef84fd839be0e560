//! `nitro remove`: drop a site from `nitro.yaml`.

use anyhow::{Context, Result};
use clap::Args;

use nitro_core::config;

/// Arguments for `nitro remove`.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Hostname of the site to remove.
    pub hostname: String,
}

impl RemoveArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let mut config = config::load_at(&home)
            .context("failed to load nitro.yaml, run `nitro init` first")?;

        let site = config
            .remove_site(&self.hostname)
            .with_context(|| format!("unable to remove '{}'", self.hostname))?;
        let path = config::save_at(&home, &config).context("failed to save nitro.yaml")?;

        println!("✓ removed {} from {}", site.hostname, path.display());
        println!("Run 'nitro apply' to remove its container.");
        Ok(())
    }
}
