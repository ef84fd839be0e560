//! Domain types for the declarative environment.
//!
//! The whole file is loaded once per run and handed to the reconciler as a
//! read-only view. All path fields use `PathBuf`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Database engine image family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    #[default]
    Mysql,
    Mariadb,
    Postgres,
}

impl DatabaseEngine {
    /// Engines that speak the MySQL wire protocol share dump tooling.
    pub fn compatibility(&self) -> &'static str {
        match self {
            DatabaseEngine::Mysql | DatabaseEngine::Mariadb => "mysql",
            DatabaseEngine::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseEngine::Mysql => write!(f, "mysql"),
            DatabaseEngine::Mariadb => write!(f, "mariadb"),
            DatabaseEngine::Postgres => write!(f, "postgres"),
        }
    }
}

/// Optional auxiliary services an environment can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    DynamoDb,
    Mailhog,
    Redis,
}

impl ServiceKind {
    pub fn all() -> &'static [ServiceKind] {
        &[ServiceKind::DynamoDb, ServiceKind::Mailhog, ServiceKind::Redis]
    }

    /// Container and label name for the service.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::DynamoDb => "dynamodb",
            ServiceKind::Mailhog => "mailhog",
            ServiceKind::Redis => "redis",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Resource specs
// ---------------------------------------------------------------------------

/// A database engine container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub engine: DatabaseEngine,
    pub version: String,
    pub port: String,
}

impl Database {
    /// `<engine>-<version>-<port>.database.nitro`
    pub fn hostname(&self) -> String {
        format!(
            "{}-{}-{}.database.nitro",
            self.engine,
            self.version.trim(),
            self.port.trim()
        )
    }
}

/// A bind-mounted directory served from its own utility container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub path: PathBuf,
    #[serde(default = "default_php_version")]
    pub version: String,
}

/// A site served through the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub path: PathBuf,
    #[serde(default = "default_php_version")]
    pub version: String,
    #[serde(default = "default_webroot")]
    pub webroot: String,
    #[serde(default)]
    pub xdebug: bool,
}

/// Auxiliary service toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Services {
    #[serde(default)]
    pub dynamodb: bool,
    #[serde(default)]
    pub mailhog: bool,
    #[serde(default)]
    pub redis: bool,
}

impl Services {
    pub fn is_enabled(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::DynamoDb => self.dynamodb,
            ServiceKind::Mailhog => self.mailhog,
            ServiceKind::Redis => self.redis,
        }
    }

    /// Enabled services, in a fixed order.
    pub fn enabled(&self) -> Vec<ServiceKind> {
        ServiceKind::all()
            .iter()
            .copied()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

/// Environment-wide PHP settings applied to every site container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Php {
    #[serde(default)]
    pub display_errors: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_limit: String,
    #[serde(default)]
    pub max_execution_time: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub upload_max_file_size: String,
    #[serde(default)]
    pub max_input_vars: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub post_max_size: String,
    #[serde(default)]
    pub opcache_enable: bool,
    #[serde(default)]
    pub opcache_revalidate_freq: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Blackfire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_token: String,
}

/// Root of `~/.nitro/nitro.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub databases: Vec<Database>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    #[serde(default)]
    pub services: Services,
    #[serde(default)]
    pub php: Php,
    #[serde(default)]
    pub blackfire: Blackfire,
    #[serde(default)]
    pub sites: Vec<Site>,
}

impl Config {
    /// Every site hostname followed by its aliases, in declaration order.
    pub fn all_hostnames(&self) -> Vec<String> {
        self.sites
            .iter()
            .flat_map(|site| std::iter::once(&site.hostname).chain(site.aliases.iter()))
            .cloned()
            .collect()
    }

    /// Remove a declared site by hostname.
    pub fn remove_site(&mut self, hostname: &str) -> Result<Site, ConfigError> {
        let index = self
            .sites
            .iter()
            .position(|s| s.hostname == hostname)
            .ok_or_else(|| ConfigError::SiteNotFound {
                hostname: hostname.to_string(),
            })?;
        Ok(self.sites.remove(index))
    }

    /// PHP and Blackfire settings as `KEY=value` container environment entries.
    pub fn as_envs(&self) -> Vec<String> {
        let php = &self.php;
        let mut envs = Vec::new();

        let display = if php.display_errors { "on" } else { "off" };
        envs.push(format!("PHP_DISPLAY_ERRORS={display}"));
        envs.push(format!(
            "PHP_MEMORY_LIMIT={}",
            or_default(&php.memory_limit, "512M")
        ));
        envs.push(format!(
            "PHP_MAX_EXECUTION_TIME={}",
            nonzero_or(php.max_execution_time, 5000)
        ));
        envs.push(format!(
            "PHP_UPLOAD_MAX_FILESIZE={}",
            or_default(&php.upload_max_file_size, "512M")
        ));
        envs.push(format!(
            "PHP_MAX_INPUT_VARS={}",
            nonzero_or(php.max_input_vars, 5000)
        ));
        envs.push(format!(
            "PHP_POST_MAX_SIZE={}",
            or_default(&php.post_max_size, "512M")
        ));
        envs.push(format!(
            "PHP_OPCACHE_ENABLE={}",
            if php.opcache_enable { 1 } else { 0 }
        ));
        envs.push(format!(
            "PHP_OPCACHE_REVALIDATE_FREQ={}",
            php.opcache_revalidate_freq
        ));

        if !self.blackfire.server_id.is_empty() {
            envs.push(format!("BLACKFIRE_SERVER_ID={}", self.blackfire.server_id));
        }
        if !self.blackfire.server_token.is_empty() {
            envs.push(format!(
                "BLACKFIRE_SERVER_TOKEN={}",
                self.blackfire.server_token
            ));
        }

        envs
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

fn nonzero_or(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

fn default_php_version() -> String {
    "8.0".to_string()
}

fn default_webroot() -> String {
    "web".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
