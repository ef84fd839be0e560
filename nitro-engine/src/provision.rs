use async_trait::async_trait;

use nitro_core::{Database, Mount, ServiceKind, Site};

use crate::error::EngineError;

/// Start-or-create collaborators, one per resource class.
///
/// Each call is idempotent: the same spec yields the existing container's id
/// rather than a duplicate.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn database(&self, network_id: &str, database: &Database) -> Result<String, EngineError>;

    async fn mount(&self, network_id: &str, mount: &Mount) -> Result<String, EngineError>;

    /// `None` when the service has nothing to run on this host.
    async fn service(
        &self,
        network_id: &str,
        kind: ServiceKind,
    ) -> Result<Option<String>, EngineError>;

    async fn site(&self, network_id: &str, site: &Site) -> Result<String, EngineError>;
}
