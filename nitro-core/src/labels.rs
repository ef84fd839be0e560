//! Ownership labels and container role decoding.
//!
//! Labels are read once, when a container is queried from the engine, and
//! decoded into a [`ContainerRole`]. Nothing downstream compares label strings.

use std::collections::HashMap;
use std::fmt;

pub const MANAGED: &str = "com.craftcms.nitro";
pub const PROXY: &str = "com.craftcms.nitro.proxy";
pub const DATABASE_ENGINE: &str = "com.craftcms.nitro.database-engine";
pub const DATABASE_COMPATIBILITY: &str = "com.craftcms.nitro.database-compatibility";
pub const DATABASE_VERSION: &str = "com.craftcms.nitro.database-version";
pub const SITE: &str = "com.craftcms.nitro.site";
pub const MOUNT: &str = "com.craftcms.nitro.mount";
pub const SERVICE: &str = "com.craftcms.nitro.service";

/// `label=value` filter selecting every container the tool owns.
pub fn managed_filter() -> String {
    format!("{MANAGED}=true")
}

/// Dump/listing dialect of a database container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseCompatibility {
    MySql,
    Postgres,
}

impl DatabaseCompatibility {
    /// Anything that does not announce itself as postgres is treated as MySQL.
    pub fn from_label(value: &str) -> Self {
        if value.eq_ignore_ascii_case("postgres") {
            DatabaseCompatibility::Postgres
        } else {
            DatabaseCompatibility::MySql
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseCompatibility::MySql => "mysql",
            DatabaseCompatibility::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DatabaseCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a managed container is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRole {
    Proxy,
    Database {
        engine: String,
        compatibility: DatabaseCompatibility,
    },
    Site {
        hostname: String,
    },
    Mount,
    Service {
        name: String,
    },
    /// Managed, but carries no role label this version understands.
    Unknown,
}

impl ContainerRole {
    /// Decode a label set. Precedence: proxy, database, site, mount, service.
    pub fn from_labels(labels: &HashMap<String, String>) -> Self {
        let non_empty = |key: &str| labels.get(key).filter(|v| !v.is_empty());

        if non_empty(PROXY).is_some() {
            return ContainerRole::Proxy;
        }
        if let Some(engine) = non_empty(DATABASE_ENGINE) {
            let compatibility = non_empty(DATABASE_COMPATIBILITY)
                .map(|v| DatabaseCompatibility::from_label(v))
                .unwrap_or(DatabaseCompatibility::MySql);
            return ContainerRole::Database {
                engine: engine.clone(),
                compatibility,
            };
        }
        if let Some(hostname) = non_empty(SITE) {
            return ContainerRole::Site {
                hostname: hostname.clone(),
            };
        }
        if non_empty(MOUNT).is_some() {
            return ContainerRole::Mount;
        }
        if let Some(name) = non_empty(SERVICE) {
            return ContainerRole::Service { name: name.clone() };
        }
        ContainerRole::Unknown
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self, ContainerRole::Proxy)
    }
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRole::Proxy => write!(f, "proxy"),
            ContainerRole::Database { engine, .. } => write!(f, "database ({engine})"),
            ContainerRole::Site { hostname } => write!(f, "site ({hostname})"),
            ContainerRole::Mount => write!(f, "mount"),
            ContainerRole::Service { name } => write!(f, "service ({name})"),
            ContainerRole::Unknown => write!(f, "unknown"),
        }
    }
}

/// A container as observed from the engine during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub state: String,
    pub role: ContainerRole,
}

impl ContainerRecord {
    /// Build from raw engine fields. Leading `/` on engine names is dropped.
    pub fn new(
        id: impl Into<String>,
        name: impl AsRef<str>,
        state: impl Into<String>,
        labels: &HashMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.as_ref().trim_start_matches('/').to_string(),
            state: state.into(),
            role: ContainerRole::from_labels(labels),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRecord {
    pub id: String,
    pub name: String,
}
