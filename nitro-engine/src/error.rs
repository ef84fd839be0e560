use std::path::PathBuf;

use thiserror::Error;

/// Error surface for container engine, backup, and provisioning calls.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` in {container} exited with {code}: {stderr}")]
    Exec {
        container: String,
        command: String,
        code: i64,
        stderr: String,
    },

    #[error("unable to locate the proxy container")]
    ProxyNotFound,

    #[error("engine returned a container without an id")]
    MissingId,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.into(),
        source,
    }
}
