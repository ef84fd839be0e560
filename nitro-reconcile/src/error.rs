use std::path::PathBuf;

use thiserror::Error;

use nitro_engine::EngineError;
use nitro_hosts::HostsError;
use nitro_proxy::ProxyError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A start-or-create collaborator failed; later phases were not run.
    #[error("unable to start {kind} {name}: {source}")]
    Provision {
        kind: &'static str,
        name: String,
        #[source]
        source: EngineError,
    },

    /// Stop or remove of an orphan failed; the sweep stopped here.
    #[error("unable to {action} container {container}: {source}")]
    Teardown {
        action: &'static str,
        container: String,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error(transparent)]
    Hosts(#[from] HostsError),

    #[error("unable to update hosts file {path}: {reason}")]
    HostsEditor { path: PathBuf, reason: String },

    #[error("reconcile cancelled")]
    Cancelled,
}

impl ReconcileError {
    /// Proxy cancellation surfaces as a plain cancel.
    pub(crate) fn from_proxy(err: ProxyError) -> Self {
        match err {
            ProxyError::Cancelled => ReconcileError::Cancelled,
            other => ReconcileError::Proxy(other),
        }
    }
}
