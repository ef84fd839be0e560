//! Environment config persistence.
//!
//! # Storage layout
//!
//! ```text
//! ~/.nitro/
//!   nitro.yaml            (mode 0600)
//!   <container-name>/     (database dumps taken before teardown)
//! ```
//!
//! Every function has an explicit-home `_at` form used by tests and a no-arg
//! wrapper that derives home from `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paths::{config_path, nitro_root};
use crate::types::Config;

/// Load `<home>/.nitro/nitro.yaml`.
///
/// Returns `ConfigError::NotFound` if absent and `ConfigError::Parse` (with
/// path and line context) if malformed.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path(home);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Atomically save the config: serialize, write `nitro.yaml.tmp`, chmod, rename.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = nitro_root(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path(home);
    let tmp = path.with_file_name("nitro.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path)?;
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, config)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_config_returns_not_found() {
        let home = TempDir::new().expect("tempdir");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn save_then_load_default() {
        let home = TempDir::new().expect("tempdir");
        save_at(home.path(), &Config::default()).expect("save");
        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}
