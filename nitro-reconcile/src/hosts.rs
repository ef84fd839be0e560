use std::path::Path;

use async_trait::async_trait;

use crate::error::ReconcileError;

/// Writes the managed hosts block, elevating privileges if it has to.
///
/// Only called once [`nitro_hosts::is_current`] has reported the block stale.
#[async_trait]
pub trait HostsEditor: Send + Sync {
    async fn apply(
        &self,
        path: &Path,
        address: &str,
        hostnames: &[String],
    ) -> Result<(), ReconcileError>;
}
