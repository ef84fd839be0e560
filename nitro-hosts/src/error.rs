//! Error types for nitro-hosts.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostsError {
    /// The hosts file does not exist.
    #[error("hosts file not found at {path}")]
    NotFound { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A start marker without a matching end marker (or the reverse).
    #[error("unterminated managed block in {path} at line {line}")]
    Malformed { path: PathBuf, line: usize },

    /// Nothing to map; an empty block is never written.
    #[error("no hostnames given")]
    NoHostnames,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> HostsError {
    match source.kind() {
        std::io::ErrorKind::NotFound => HostsError::NotFound { path: path.into() },
        _ => HostsError::Io {
            path: path.into(),
            source,
        },
    }
}
