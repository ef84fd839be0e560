//! Docker implementations of the engine seams.

mod exec;
mod provision;

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::{
    ListContainersOptions, RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::network::ListNetworksOptions;
use bollard::Docker;

use nitro_core::{labels, ContainerRecord, NetworkRecord};

use crate::engine::ContainerEngine;
use crate::error::EngineError;

pub use exec::{parse_database_list, DockerBackup};
pub use provision::{declared_names, DockerProvisioner};

/// Connect using `DOCKER_HOST` or the platform default socket.
pub fn connect() -> Result<Docker, EngineError> {
    Ok(Docker::connect_with_local_defaults()?)
}

#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

pub(crate) fn label_filter(extra: &[(&str, String)]) -> HashMap<String, Vec<String>> {
    let mut filters = HashMap::new();
    filters.insert("label".to_string(), vec![labels::managed_filter()]);
    for (key, value) in extra {
        filters
            .entry(key.to_string())
            .or_insert_with(Vec::new)
            .push(value.clone());
    }
    filters
}

/// Docker answers 304 when the container is already in the requested state.
fn is_not_modified(err: &BollardError) -> bool {
    matches!(
        err,
        BollardError::DockerResponseServerError {
            status_code: 304,
            ..
        }
    )
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn list_managed(&self) -> Result<Vec<ContainerRecord>, EngineError> {
        let summaries = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                filters: label_filter(&[]),
                ..Default::default()
            }))
            .await?;

        summaries
            .into_iter()
            .map(|summary| {
                let id = summary.id.ok_or(EngineError::MissingId)?;
                let name = summary
                    .names
                    .and_then(|names| names.into_iter().next())
                    .unwrap_or_else(|| id.clone());
                let state = summary.state.unwrap_or_default();
                let labels = summary.labels.unwrap_or_default();
                Ok(ContainerRecord::new(id, name, state, &labels))
            })
            .collect()
    }

    async fn find_network(&self, name: &str) -> Result<Option<NetworkRecord>, EngineError> {
        let networks = self
            .docker
            .list_networks(Some(ListNetworksOptions::<String> {
                filters: label_filter(&[("name", name.to_string())]),
            }))
            .await?;

        // The name filter is a substring match; require an exact hit.
        Ok(networks.into_iter().find_map(|network| {
            match (network.id, network.name) {
                (Some(id), Some(n)) if n == name && !id.is_empty() => {
                    Some(NetworkRecord { id, name: n })
                }
                _ => None,
            }
        }))
    }

    async fn start(&self, id: &str) -> Result<(), EngineError> {
        match self
            .docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if is_not_modified(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn stop(&self, id: &str) -> Result<(), EngineError> {
        match self
            .docker
            .stop_container(id, None::<StopContainerOptions>)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if is_not_modified(&err) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, id: &str) -> Result<(), EngineError> {
        self.docker
            .remove_container(id, None::<RemoveContainerOptions>)
            .await?;
        Ok(())
    }
}
