//! # nitro-reconcile
//!
//! Converges the container runtime, the proxy and the hosts file on the
//! declared environment.
//!
//! - [`Reconciler`] runs the full pass: prerequisites, provisioning in fixed
//!   phase order, proxy sync, orphan sweep, hosts merge
//! - [`Sweeper`] backs up and tears down managed containers that were not
//!   declared this run
//! - [`KnownContainers`] is the per-run accumulator threading the two together
//! - [`Reporter`] receives human progress lines; the core never prints

mod cancel;
pub mod error;
pub mod hosts;
pub mod known;
pub mod reconcile;
pub mod report;
pub mod sweep;

pub use error::ReconcileError;
pub use hosts::HostsEditor;
pub use known::KnownContainers;
pub use reconcile::{ApplyReport, HostsAction, ReconcileOptions, ReconcileOutcome, Reconciler};
pub use report::{NullReporter, Reporter};
pub use sweep::{BackupFailure, SweepReport, Sweeper};
