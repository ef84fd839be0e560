use std::path::PathBuf;

use async_trait::async_trait;
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::Docker;
use futures::StreamExt;

use nitro_core::DatabaseCompatibility;

use crate::backup::{BackupRequest, DatabaseBackup};
use crate::error::{io_err, EngineError};

const SYSTEM_DATABASES: &[&str] = &[
    "information_schema",
    "mysql",
    "performance_schema",
    "sys",
    "postgres",
];

struct ExecOutput {
    stdout: Vec<u8>,
    stderr: String,
}

/// Runs commands inside database containers to list and dump databases.
#[derive(Clone)]
pub struct DockerBackup {
    docker: Docker,
}

impl DockerBackup {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Run `command` in the container and fail on a non-zero exit.
    async fn run(&self, container_id: &str, command: &[String]) -> Result<ExecOutput, EngineError> {
        let exec = self
            .docker
            .create_exec(
                container_id,
                CreateExecOptions {
                    cmd: Some(command.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let mut output = ExecOutput {
            stdout: Vec::new(),
            stderr: String::new(),
        };
        if let StartExecResults::Attached { output: mut stream, .. } =
            self.docker.start_exec(&exec.id, None).await?
        {
            while let Some(chunk) = stream.next().await {
                match chunk? {
                    LogOutput::StdOut { message } => output.stdout.extend_from_slice(&message),
                    LogOutput::StdErr { message } => {
                        output.stderr.push_str(&String::from_utf8_lossy(&message))
                    }
                    _ => {}
                }
            }
        }

        let code = self
            .docker
            .inspect_exec(&exec.id)
            .await?
            .exit_code
            .unwrap_or(0);
        if code != 0 {
            return Err(EngineError::Exec {
                container: container_id.to_string(),
                command: command.join(" "),
                code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn list_command(compatibility: DatabaseCompatibility) -> Vec<String> {
    let args: &[&str] = match compatibility {
        DatabaseCompatibility::Postgres => &[
            "psql",
            "--username=nitro",
            "--tuples-only",
            "--no-align",
            "--command",
            "SELECT datname FROM pg_database WHERE datistemplate = false;",
        ],
        DatabaseCompatibility::MySql => &[
            "mysql",
            "-h",
            "127.0.0.1",
            "-unitro",
            "--password=nitro",
            "--skip-column-names",
            "--execute",
            "SHOW DATABASES;",
        ],
    };
    args.iter().map(|a| a.to_string()).collect()
}

/// One database name per line; blank lines and system catalogues dropped.
pub fn parse_database_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && !SYSTEM_DATABASES.contains(name))
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl DatabaseBackup for DockerBackup {
    async fn list_databases(
        &self,
        container_id: &str,
        compatibility: DatabaseCompatibility,
    ) -> Result<Vec<String>, EngineError> {
        let output = self.run(container_id, &list_command(compatibility)).await?;
        Ok(parse_database_list(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn perform(&self, request: &BackupRequest) -> Result<PathBuf, EngineError> {
        self.run(&request.container_id, &request.command).await?;

        let staged = request.staged_path();
        let dump = self
            .run(&request.container_id, &["cat".to_string(), staged.clone()])
            .await?;

        tokio::fs::create_dir_all(&request.destination)
            .await
            .map_err(|e| io_err(&request.destination, e))?;
        let host_path = request.host_path();
        tokio::fs::write(&host_path, &dump.stdout)
            .await
            .map_err(|e| io_err(&host_path, e))?;

        if let Err(err) = self
            .run(&request.container_id, &["rm".to_string(), "-f".to_string(), staged])
            .await
        {
            tracing::warn!(error = %err, container = %request.container_name, "could not remove staged dump");
        }

        tracing::info!(
            database = %request.database,
            path = %host_path.display(),
            bytes = dump.stdout.len(),
            "database backed up",
        );
        Ok(host_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_listing_drops_system_schemas() {
        let out = "information_schema\ncraft\nmysql\nperformance_schema\nsys\nshop\n";
        assert_eq!(parse_database_list(out), ["craft", "shop"]);
    }

    #[test]
    fn postgres_listing_trims_and_drops_postgres() {
        let out = " postgres\n craft \n\n";
        assert_eq!(parse_database_list(out), ["craft"]);
    }

    #[test]
    fn list_command_matches_engine_family() {
        assert_eq!(list_command(DatabaseCompatibility::Postgres)[0], "psql");
        assert_eq!(list_command(DatabaseCompatibility::MySql)[0], "mysql");
    }
}
