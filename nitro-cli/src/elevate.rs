//! Hosts file writes from `apply`, re-running this binary with privileges.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use nitro_reconcile::{HostsEditor, ReconcileError};

/// Runs `nitro hosts …`, through `sudo` on Unix.
#[derive(Debug, Clone)]
pub struct SudoHostsEditor {
    exe: PathBuf,
    elevate: bool,
}

impl SudoHostsEditor {
    pub fn current() -> Result<Self> {
        let exe = std::env::current_exe().context("unable to locate the nitro executable")?;
        Ok(Self {
            exe,
            elevate: cfg!(unix),
        })
    }

    fn command(&self, path: &Path, address: &str, hostnames: &[String]) -> Command {
        let mut cmd = if self.elevate {
            let mut sudo = Command::new("sudo");
            sudo.arg(&self.exe);
            sudo
        } else {
            Command::new(&self.exe)
        };
        cmd.arg("hosts")
            .arg(format!("--hostnames={}", hostnames.join(",")))
            .arg("--address")
            .arg(address)
            .arg("--path")
            .arg(path)
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl HostsEditor for SudoHostsEditor {
    async fn apply(
        &self,
        path: &Path,
        address: &str,
        hostnames: &[String],
    ) -> Result<(), ReconcileError> {
        let failed = |reason: String| ReconcileError::HostsEditor {
            path: path.to_path_buf(),
            reason,
        };

        tracing::debug!(exe = %self.exe.display(), hosts = hostnames.len(), "invoking hosts editor");
        let status = self
            .command(path, address, hostnames)
            .status()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !status.success() {
            return Err(failed(format!("`nitro hosts` exited with {status}")));
        }
        Ok(())
    }
}
