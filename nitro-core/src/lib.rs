//! Nitro core library: environment configuration, container labels, errors.
//!
//! - [`types`]: the declarative environment model
//! - [`config`]: load / save of `~/.nitro/nitro.yaml`
//! - [`labels`]: ownership labels and [`ContainerRole`] decoding
//! - [`paths`]: well-known locations under the user's home directory
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod labels;
pub mod paths;
pub mod types;

pub use error::ConfigError;
pub use labels::{ContainerRecord, ContainerRole, DatabaseCompatibility, NetworkRecord};
pub use types::{
    Blackfire, Config, Database, DatabaseEngine, Mount, Php, ServiceKind, Services, Site,
};
