//! Pre-teardown database dumps.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use nitro_core::{paths::backup_dir, DatabaseCompatibility};

use crate::error::EngineError;

/// Directory inside the container where dumps are staged.
pub const STAGING_DIR: &str = "/tmp";

/// One database dump, built per database found in an orphaned container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRequest {
    pub container_id: String,
    pub container_name: String,
    pub database: String,
    /// `<db>-<MM-DD-YYYY_HH_MM_SS>.sql`
    pub file_name: String,
    /// Dump command run inside the container; writes to the staging dir.
    pub command: Vec<String>,
    /// Host directory the dump is copied into.
    pub destination: PathBuf,
}

impl BackupRequest {
    pub fn new(
        container_id: &str,
        container_name: &str,
        database: &str,
        compatibility: DatabaseCompatibility,
        home: &Path,
        timestamp: NaiveDateTime,
    ) -> Self {
        let file_name = backup_file_name(database, timestamp);
        let command = dump_command(compatibility, database, &file_name);
        Self {
            container_id: container_id.to_string(),
            container_name: container_name.to_string(),
            database: database.to_string(),
            file_name,
            command,
            destination: backup_dir(home, container_name),
        }
    }

    /// `/tmp/<file_name>` inside the container.
    pub fn staged_path(&self) -> String {
        format!("{STAGING_DIR}/{}", self.file_name)
    }

    /// Where the dump lands on the host.
    pub fn host_path(&self) -> PathBuf {
        self.destination.join(&self.file_name)
    }
}

pub fn backup_file_name(database: &str, timestamp: NaiveDateTime) -> String {
    format!("{database}-{}.sql", timestamp.format("%m-%d-%Y_%H_%M_%S"))
}

fn dump_command(compatibility: DatabaseCompatibility, database: &str, file_name: &str) -> Vec<String> {
    let staged = format!("{STAGING_DIR}/{file_name}");
    match compatibility {
        DatabaseCompatibility::Postgres => vec![
            "pg_dump".to_string(),
            "--username=nitro".to_string(),
            database.to_string(),
            "-f".to_string(),
            staged,
        ],
        DatabaseCompatibility::MySql => vec![
            "/usr/bin/mysqldump".to_string(),
            "-h".to_string(),
            "127.0.0.1".to_string(),
            "-unitro".to_string(),
            "--password=nitro".to_string(),
            database.to_string(),
            format!("--result-file={staged}"),
        ],
    }
}

/// Backup collaborator used by the orphan sweep.
#[async_trait]
pub trait DatabaseBackup: Send + Sync {
    /// User databases inside the container; system catalogues are excluded.
    async fn list_databases(
        &self,
        container_id: &str,
        compatibility: DatabaseCompatibility,
    ) -> Result<Vec<String>, EngineError>;

    /// Run the dump and copy it to the host. Returns the host path.
    async fn perform(&self, request: &BackupRequest) -> Result<PathBuf, EngineError>;
}
