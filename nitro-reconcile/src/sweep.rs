//! Orphan sweep: back up and tear down managed containers nobody declared.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;

use nitro_core::{ContainerRecord, ContainerRole, DatabaseCompatibility};
use nitro_engine::{BackupRequest, ContainerEngine, DatabaseBackup};

use crate::cancel::guard;
use crate::error::ReconcileError;
use crate::known::KnownContainers;
use crate::report::Reporter;

/// A database dump that failed; the sweep carried on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFailure {
    pub container: String,
    pub database: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Names of containers stopped and removed.
    pub removed: Vec<String>,
    /// Host paths of dumps written.
    pub backups: Vec<PathBuf>,
    pub failed_backups: Vec<BackupFailure>,
    /// Orphaned database containers left alone because their databases
    /// could not be listed.
    pub skipped: Vec<String>,
}

/// Collaborators for one sweep.
pub struct Sweeper<'a> {
    pub engine: &'a dyn ContainerEngine,
    pub backup: &'a dyn DatabaseBackup,
    pub reporter: &'a dyn Reporter,
    /// Backups land under `<home>/.nitro/<container>/`.
    pub home: &'a Path,
}

impl Sweeper<'_> {
    /// Remove every managed container not in `known`.
    ///
    /// The proxy is never touched. Database containers are dumped first; a
    /// failed dump is recorded and the next database attempted, while a
    /// failed listing leaves that container in place. Stop and remove
    /// failures end the sweep.
    pub async fn sweep(
        &self,
        known: &KnownContainers,
        now: NaiveDateTime,
        cancel: &CancellationToken,
    ) -> Result<SweepReport, ReconcileError> {
        let mut report = SweepReport::default();
        let containers = guard(cancel, self.engine.list_managed()).await??;

        for container in containers {
            if known.contains(&container.id) {
                continue;
            }

            match &container.role {
                ContainerRole::Proxy => {
                    tracing::debug!(container = %container.name, "proxy is never swept");
                    continue;
                }
                ContainerRole::Database { compatibility, .. } => {
                    let listed = self
                        .backup_databases(&container, *compatibility, now, cancel, &mut report)
                        .await?;
                    if !listed {
                        report.skipped.push(container.name.clone());
                        continue;
                    }
                }
                _ => {}
            }

            self.teardown(&container, cancel).await?;
            report.removed.push(container.name);
        }

        tracing::info!(
            removed = report.removed.len(),
            backups = report.backups.len(),
            failed_backups = report.failed_backups.len(),
            skipped = report.skipped.len(),
            "sweep finished",
        );
        Ok(report)
    }

    /// Returns `false` when the databases could not be listed.
    async fn backup_databases(
        &self,
        container: &ContainerRecord,
        compatibility: DatabaseCompatibility,
        now: NaiveDateTime,
        cancel: &CancellationToken,
        report: &mut SweepReport,
    ) -> Result<bool, ReconcileError> {
        let databases = match guard(
            cancel,
            self.backup.list_databases(&container.id, compatibility),
        )
        .await?
        {
            Ok(databases) => databases,
            Err(err) => {
                tracing::warn!(container = %container.name, error = %err, "unable to list databases, leaving container");
                self.reporter.warning(&format!(
                    "unable to get the databases from {}, skipping removal",
                    container.name
                ));
                return Ok(false);
            }
        };

        for database in databases {
            let request = BackupRequest::new(
                &container.id,
                &container.name,
                &database,
                compatibility,
                self.home,
                now,
            );
            self.reporter
                .pending(&format!("backing up {database} from {}", container.name));
            match guard(cancel, self.backup.perform(&request)).await? {
                Ok(path) => {
                    self.reporter.done();
                    self.reporter.info(&format!("backup saved in {}", path.display()));
                    report.backups.push(path);
                }
                Err(err) => {
                    tracing::warn!(container = %container.name, database = %database, error = %err, "backup failed");
                    self.reporter
                        .warning(&format!("unable to backup {database}: {err}"));
                    report.failed_backups.push(BackupFailure {
                        container: container.name.clone(),
                        database,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(true)
    }

    async fn teardown(
        &self,
        container: &ContainerRecord,
        cancel: &CancellationToken,
    ) -> Result<(), ReconcileError> {
        self.reporter.pending(&format!("removing {}", container.name));

        guard(cancel, self.engine.stop(&container.id))
            .await?
            .map_err(|source| ReconcileError::Teardown {
                action: "stop",
                container: container.name.clone(),
                source,
            })?;
        guard(cancel, self.engine.remove(&container.id))
            .await?
            .map_err(|source| ReconcileError::Teardown {
                action: "remove",
                container: container.name.clone(),
                source,
            })?;

        self.reporter.done();
        tracing::info!(container = %container.name, id = %container.id, "removed orphan");
        Ok(())
    }
}
