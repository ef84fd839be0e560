use async_trait::async_trait;

use nitro_core::{ContainerRecord, NetworkRecord};

use crate::error::EngineError;

/// Query and control interface over the container runtime.
///
/// Each call is atomic from the caller's point of view; no multi-call
/// transaction is implied.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Every container (running or not) carrying the managed label.
    async fn list_managed(&self) -> Result<Vec<ContainerRecord>, EngineError>;

    /// The managed network with exactly this name, if any.
    async fn find_network(&self, name: &str) -> Result<Option<NetworkRecord>, EngineError>;

    async fn start(&self, id: &str) -> Result<(), EngineError>;

    /// Stopping an already stopped container succeeds.
    async fn stop(&self, id: &str) -> Result<(), EngineError>;

    async fn remove(&self, id: &str) -> Result<(), EngineError>;
}

/// Locate the proxy container and make sure it is running.
pub async fn find_and_start_proxy(
    engine: &dyn ContainerEngine,
) -> Result<ContainerRecord, EngineError> {
    let proxy = engine
        .list_managed()
        .await?
        .into_iter()
        .find(|c| c.role.is_proxy())
        .ok_or(EngineError::ProxyNotFound)?;

    if proxy.state != "running" {
        tracing::info!(container = %proxy.name, state = %proxy.state, "starting proxy");
        engine.start(&proxy.id).await?;
    }
    Ok(proxy)
}
