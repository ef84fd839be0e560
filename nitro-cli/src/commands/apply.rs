//! `nitro apply`: converge the environment on `nitro.yaml`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use nitro_core::{config, paths};
use nitro_engine::docker::{self, DockerBackup, DockerEngine, DockerProvisioner};
use nitro_proxy::TcpProxyClient;
use nitro_reconcile::{
    HostsAction, ReconcileOptions, ReconcileOutcome, Reconciler, SweepReport,
};

use crate::elevate::SudoHostsEditor;
use crate::reporter::TerminalReporter;

/// Arguments for `nitro apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Leave the hosts file untouched. Same as `NITRO_EDIT_HOSTS=false`.
    #[arg(long)]
    pub skip_hosts: bool,

    /// Hosts file to manage instead of the system one.
    #[arg(long, value_name = "FILE")]
    pub hosts_path: Option<PathBuf>,
}

impl ApplyArgs {
    pub async fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let config = config::load_at(&home)
            .context("failed to load nitro.yaml, run `nitro init` first")?;

        let docker = docker::connect().context("unable to connect to docker")?;
        let engine = DockerEngine::new(docker.clone());
        let backup = DockerBackup::new(docker.clone());
        let provisioner = DockerProvisioner::new(docker, config.as_envs());
        let proxy = TcpProxyClient::local(paths::api_port());
        let hosts = SudoHostsEditor::current()?;
        let reporter = TerminalReporter::default();

        let mut options = ReconcileOptions::new(&home);
        if self.skip_hosts {
            options.edit_hosts = false;
        }
        if let Some(path) = self.hosts_path {
            options.hosts_path = path;
        }

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling");
                on_interrupt.cancel();
            }
        });

        let outcome = Reconciler {
            engine: &engine,
            backup: &backup,
            provisioner: &provisioner,
            proxy: &proxy,
            hosts: &hosts,
            reporter: &reporter,
        }
        .reconcile(&config, &options, &cancel)
        .await
        .context("apply failed")?;

        if let ReconcileOutcome::Applied(report) = outcome {
            print_summary(&report.sweep, report.hosts);
        }
        Ok(())
    }
}

fn print_summary(sweep: &SweepReport, hosts: HostsAction) {
    for name in &sweep.removed {
        println!("  ✎  removed {name}");
    }
    for path in &sweep.backups {
        println!("  ·  backup {}", path.display());
    }
    for failure in &sweep.failed_backups {
        println!(
            "  !  no backup of {} from {}: {}",
            failure.database, failure.container, failure.reason
        );
    }
    for name in &sweep.skipped {
        println!("  !  kept {name}, its databases could not be listed");
    }
    if hosts == HostsAction::Skipped {
        println!("  ·  hosts file not modified");
    }
}
