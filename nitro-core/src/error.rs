//! Error types for nitro-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading or editing the environment config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `nitro init` to create one")]
    NotFound { path: PathBuf },

    /// `remove_site` was asked for a hostname that is not declared.
    #[error("unable to find site {hostname}")]
    SiteNotFound { hostname: String },
}
