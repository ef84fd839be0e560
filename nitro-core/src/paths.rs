use std::path::{Path, PathBuf};

pub const NITRO_DIR: &str = ".nitro";
pub const CONFIG_FILE: &str = "nitro.yaml";

/// Name of the bridge network every environment container joins.
pub const NETWORK_NAME: &str = "nitro-network";

/// Loopback address written into the managed hosts block.
pub const LOOPBACK: &str = "127.0.0.1";

/// Upstream port the proxy forwards site traffic to.
pub const SITE_UPSTREAM_PORT: u16 = 8080;

pub const DEFAULT_API_PORT: u16 = 5000;
pub const API_PORT_ENV: &str = "NITRO_API_PORT";
pub const EDIT_HOSTS_ENV: &str = "NITRO_EDIT_HOSTS";

pub fn nitro_root(home: &Path) -> PathBuf {
    home.join(NITRO_DIR)
}

pub fn config_path(home: &Path) -> PathBuf {
    nitro_root(home).join(CONFIG_FILE)
}

/// `<home>/.nitro/<container>/`, where database dumps for a container land.
pub fn backup_dir(home: &Path, container_name: &str) -> PathBuf {
    nitro_root(home).join(container_name)
}

/// Proxy API port, honouring `NITRO_API_PORT` when it parses.
pub fn api_port() -> u16 {
    std::env::var(API_PORT_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_API_PORT)
}

/// `false` only when `NITRO_EDIT_HOSTS` is explicitly `false`.
pub fn hosts_editing_enabled() -> bool {
    !matches!(std::env::var(EDIT_HOSTS_ENV).as_deref(), Ok("false"))
}
