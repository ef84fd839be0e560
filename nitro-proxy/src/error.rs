use std::time::Duration;

use thiserror::Error;

/// Error surface for the proxy client and handshake.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("I/O error talking to proxy at {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("proxy at {addr} did not answer within {timeout:?}")]
    RequestTimeout { addr: String, timeout: Duration },

    #[error("proxy closed connection before responding")]
    ConnectionClosed,

    /// The proxy answered but refused the update.
    #[error("unable to update the proxy, {0}")]
    Rejected(String),

    #[error("proxy not ready after {attempts} probes over {waited:?}")]
    ReadinessTimeout { attempts: u32, waited: Duration },

    #[error("proxy sync cancelled")]
    Cancelled,
}

pub(crate) fn io_err(addr: impl Into<String>, source: std::io::Error) -> ProxyError {
    ProxyError::Io {
        addr: addr.into(),
        source,
    }
}
