//! The full reconcile pass.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use nitro_core::{paths, Config};
use nitro_engine::{find_and_start_proxy, ContainerEngine, DatabaseBackup, EngineError, Provisioner};
use nitro_proxy::{sync_sites, ProxyApi, RetryPolicy};

use crate::cancel::guard;
use crate::error::ReconcileError;
use crate::hosts::HostsEditor;
use crate::known::KnownContainers;
use crate::report::Reporter;
use crate::sweep::{SweepReport, Sweeper};

/// Per-run settings that do not come from the environment file.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub home: PathBuf,
    pub hosts_path: PathBuf,
    /// Address every hostname maps to in the managed block.
    pub address: String,
    /// `false` when hosts editing was opted out of.
    pub edit_hosts: bool,
    pub retry: RetryPolicy,
}

impl ReconcileOptions {
    /// Defaults for `home`, honouring `NITRO_EDIT_HOSTS`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            hosts_path: nitro_hosts::default_path(),
            address: paths::LOOPBACK.to_string(),
            edit_hosts: paths::hosts_editing_enabled(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostsAction {
    /// Editing suppressed by flag or environment.
    Skipped,
    /// The managed block already matched.
    Current,
    Updated,
    /// No sites declared, so nothing to map.
    NoHostnames,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub known: KnownContainers,
    pub sweep: SweepReport,
    pub hosts: HostsAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The environment network does not exist yet; nothing was changed.
    NetworkMissing,
    /// No proxy container; nothing was changed.
    ProxyMissing,
    Applied(ApplyReport),
}

/// Collaborators for one reconcile pass.
pub struct Reconciler<'a> {
    pub engine: &'a dyn ContainerEngine,
    pub backup: &'a dyn DatabaseBackup,
    pub provisioner: &'a dyn Provisioner,
    pub proxy: &'a dyn ProxyApi,
    pub hosts: &'a dyn HostsEditor,
    pub reporter: &'a dyn Reporter,
}

impl Reconciler<'_> {
    /// Converge the runtime on `config`.
    ///
    /// A missing network or proxy ends the pass early without error. Any
    /// provisioning failure returns immediately: no proxy sync, sweep or
    /// hosts edit happens after it.
    pub async fn reconcile(
        &self,
        config: &Config,
        options: &ReconcileOptions,
        cancel: &CancellationToken,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        self.reporter.pending("checking network");
        let Some(network) = guard(cancel, self.engine.find_network(paths::NETWORK_NAME)).await??
        else {
            self.reporter
                .warning("unable to find the network, run `nitro init` to create it");
            return Ok(ReconcileOutcome::NetworkMissing);
        };
        self.reporter.done();

        self.reporter.pending("checking proxy");
        match guard(cancel, find_and_start_proxy(self.engine)).await? {
            Ok(proxy) => tracing::debug!(container = %proxy.name, "proxy running"),
            Err(EngineError::ProxyNotFound) => {
                self.reporter
                    .warning("unable to find the proxy container, run `nitro init` to create it");
                return Ok(ReconcileOutcome::ProxyMissing);
            }
            Err(err) => return Err(err.into()),
        }
        self.reporter.done();

        let mut known = KnownContainers::new();
        self.provision(config, &network.id, &mut known, cancel).await?;

        if !config.sites.is_empty() {
            self.reporter.pending("updating proxy");
            sync_sites(self.proxy, &config.sites, &options.retry, cancel)
                .await
                .map_err(ReconcileError::from_proxy)?;
            self.reporter.done();
        }

        let now = chrono::Local::now().naive_local();
        let sweep = Sweeper {
            engine: self.engine,
            backup: self.backup,
            reporter: self.reporter,
            home: &options.home,
        }
        .sweep(&known, now, cancel)
        .await?;

        let hosts = self.update_hosts(config, options, cancel).await?;

        self.reporter.success("ready!");
        Ok(ReconcileOutcome::Applied(ApplyReport {
            known,
            sweep,
            hosts,
        }))
    }

    /// Databases, then mounts, then services, then sites. Each phase only
    /// starts once the previous one fully succeeded.
    async fn provision(
        &self,
        config: &Config,
        network_id: &str,
        known: &mut KnownContainers,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        if !config.databases.is_empty() {
            self.reporter.info("checking databases");
        }
        for database in &config.databases {
            let name = database.hostname();
            self.reporter.pending(&format!("checking {name}"));
            let id = guard(cancel, self.provisioner.database(network_id, database))
                .await?
                .map_err(|source| ReconcileError::Provision {
                    kind: "database",
                    name: name.clone(),
                    source,
                })?;
            known.insert(id);
            self.reporter.done();
        }

        if !config.mounts.is_empty() {
            self.reporter.info("checking mounts");
        }
        for mount in &config.mounts {
            let name = mount.path.display().to_string();
            self.reporter.pending(&format!("checking {name}"));
            let id = guard(cancel, self.provisioner.mount(network_id, mount))
                .await?
                .map_err(|source| ReconcileError::Provision {
                    kind: "mount",
                    name,
                    source,
                })?;
            known.insert(id);
            self.reporter.done();
        }

        for kind in config.services.enabled() {
            self.reporter.pending(&format!("checking {}", kind.name()));
            let id = guard(cancel, self.provisioner.service(network_id, kind))
                .await?
                .map_err(|source| ReconcileError::Provision {
                    kind: "service",
                    name: kind.name().to_string(),
                    source,
                })?;
            if let Some(id) = id {
                known.insert(id);
            }
            self.reporter.done();
        }

        if !config.sites.is_empty() {
            self.reporter.info("checking sites");
        }
        for site in &config.sites {
            self.reporter.pending(&format!("checking {}", site.hostname));
            let id = guard(cancel, self.provisioner.site(network_id, site))
                .await?
                .map_err(|source| ReconcileError::Provision {
                    kind: "site",
                    name: site.hostname.clone(),
                    source,
                })?;
            known.insert(id);
            self.reporter.done();
        }

        tracing::info!(declared = known.len(), "provisioning finished");
        Ok(())
    }

    async fn update_hosts(
        &self,
        config: &Config,
        options: &ReconcileOptions,
        cancel: &CancellationToken,
    ) -> Result<HostsAction, ReconcileError> {
        if !options.edit_hosts {
            tracing::debug!("hosts editing disabled");
            return Ok(HostsAction::Skipped);
        }

        let hostnames = config.all_hostnames();
        if hostnames.is_empty() {
            return Ok(HostsAction::NoHostnames);
        }

        if nitro_hosts::is_current(&options.hosts_path, &options.address, &hostnames)? {
            return Ok(HostsAction::Current);
        }

        self.reporter.info("adding sites to hosts file");
        guard(
            cancel,
            self.hosts
                .apply(&options.hosts_path, &options.address, &hostnames),
        )
        .await??;
        Ok(HostsAction::Updated)
    }
}
