//! # nitro-engine
//!
//! The container-runtime seams the reconciler depends on, and their Docker
//! implementations.
//!
//! - [`ContainerEngine`]: list / start / stop / remove, network lookup
//! - [`DatabaseBackup`]: enumerate databases and dump them to the host
//! - [`Provisioner`]: idempotent start-or-create per resource class
//!
//! The [`docker`] module implements all three on top of `bollard`.

pub mod backup;
pub mod docker;
pub mod engine;
mod error;
pub mod provision;

pub use backup::{backup_file_name, BackupRequest, DatabaseBackup};
pub use engine::{find_and_start_proxy, ContainerEngine};
pub use error::EngineError;
pub use provision::Provisioner;
