//! Start-or-create for databases, mounts, services, and sites.
//!
//! Containers are matched by name. An existing container is started if it is
//! not running; otherwise the image is pulled and a container created with
//! the ownership labels and attached to the environment network.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use bollard::container::{
    Config as ContainerConfig, CreateContainerOptions, ListContainersOptions, NetworkingConfig,
    StartContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{EndpointSettings, HostConfig, PortBinding};
use bollard::Docker;
use futures::StreamExt;

use nitro_core::{
    labels, paths::NETWORK_NAME, Config, Database, DatabaseEngine, Mount, ServiceKind, Site,
};

use crate::error::EngineError;
use crate::provision::Provisioner;

use super::label_filter;

/// Everything needed to create one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ContainerSpec {
    name: String,
    image: String,
    env: Vec<String>,
    labels: HashMap<String, String>,
    binds: Vec<String>,
    /// container port (`3306/tcp`) → host port
    ports: Vec<(String, String)>,
    aliases: Vec<String>,
    cmd: Option<Vec<String>>,
}

impl ContainerSpec {
    fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        let mut labels = HashMap::new();
        labels.insert(labels::MANAGED.to_string(), "true".to_string());
        Self {
            name: name.into(),
            image: image.into(),
            labels,
            ..Default::default()
        }
    }

    fn label(mut self, key: &str, value: impl Into<String>) -> Self {
        self.labels.insert(key.to_string(), value.into());
        self
    }
}

fn database_spec(db: &Database) -> ContainerSpec {
    let name = db.hostname();
    let version = db.version.trim();
    let (image, data_dir, container_port, env) = match db.engine {
        DatabaseEngine::Postgres => (
            format!("postgres:{version}"),
            "/var/lib/postgresql/data",
            "5432/tcp",
            vec![
                "POSTGRES_USER=nitro".to_string(),
                "POSTGRES_PASSWORD=nitro".to_string(),
                "POSTGRES_DB=nitro".to_string(),
            ],
        ),
        DatabaseEngine::Mysql | DatabaseEngine::Mariadb => (
            format!("{}:{version}", db.engine),
            "/var/lib/mysql",
            "3306/tcp",
            vec![
                "MYSQL_ROOT_PASSWORD=nitro".to_string(),
                "MYSQL_DATABASE=nitro".to_string(),
                "MYSQL_USER=nitro".to_string(),
                "MYSQL_PASSWORD=nitro".to_string(),
            ],
        ),
    };

    let mut spec = ContainerSpec::new(&name, image)
        .label(labels::DATABASE_ENGINE, db.engine.to_string())
        .label(labels::DATABASE_COMPATIBILITY, db.engine.compatibility())
        .label(labels::DATABASE_VERSION, version);
    spec.env = env;
    spec.binds = vec![format!("{name}:{data_dir}")];
    spec.ports = vec![(container_port.to_string(), db.port.trim().to_string())];
    spec.aliases = vec![name];
    spec
}

fn mount_name(path: &Path) -> String {
    let slug: String = path
        .to_string_lossy()
        .trim_matches(|c| c == '/' || c == '\\')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("{slug}.mount.nitro")
}

fn mount_spec(mount: &Mount) -> ContainerSpec {
    let mut spec = ContainerSpec::new(
        mount_name(&mount.path),
        format!("craftcms/php-fpm:{}-dev", mount.version),
    )
    .label(labels::MOUNT, mount.path.to_string_lossy());
    spec.binds = vec![format!("{}:/app", mount.path.display())];
    spec.cmd = Some(vec![
        "tail".to_string(),
        "-f".to_string(),
        "/dev/null".to_string(),
    ]);
    spec
}

fn service_spec(kind: ServiceKind) -> ContainerSpec {
    let (image, ports): (&str, &[&str]) = match kind {
        ServiceKind::DynamoDb => ("amazon/dynamodb-local:latest", &["8000"]),
        ServiceKind::Mailhog => ("mailhog/mailhog:latest", &["1025", "8025"]),
        ServiceKind::Redis => ("redis:latest", &["6379"]),
    };
    let name = format!("{}.service.nitro", kind.name());
    let mut spec = ContainerSpec::new(&name, image).label(labels::SERVICE, kind.name());
    spec.ports = ports
        .iter()
        .map(|p| (format!("{p}/tcp"), p.to_string()))
        .collect();
    spec.aliases = vec![name];
    spec
}

fn site_spec(site: &Site, env: &[String]) -> ContainerSpec {
    let mut spec = ContainerSpec::new(
        &site.hostname,
        format!("craftcms/nginx:{}-dev", site.version),
    )
    .label(labels::SITE, &site.hostname);
    spec.env = env.to_vec();
    spec.env.push(format!("PHP_WEBROOT={}", site.webroot));
    spec.env.push(format!("XDEBUG_MODE={}", if site.xdebug { "develop,debug" } else { "off" }));
    spec.binds = vec![format!("{}:/app", site.path.display())];
    spec.aliases = std::iter::once(site.hostname.clone())
        .chain(site.aliases.iter().cloned())
        .collect();
    spec
}

/// Names of every container `config` declares, as [`DockerProvisioner`]
/// would create them.
pub fn declared_names(config: &Config) -> BTreeSet<String> {
    let databases = config.databases.iter().map(|db| database_spec(db).name);
    let mounts = config.mounts.iter().map(|m| mount_name(&m.path));
    let services = config.services.enabled().into_iter().map(|k| service_spec(k).name);
    let sites = config.sites.iter().map(|s| s.hostname.clone());
    databases.chain(mounts).chain(services).chain(sites).collect()
}

#[derive(Clone)]
pub struct DockerProvisioner {
    docker: Docker,
    /// Environment entries added to every site container.
    site_env: Vec<String>,
}

impl DockerProvisioner {
    pub fn new(docker: Docker, site_env: Vec<String>) -> Self {
        Self { docker, site_env }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<(String, String)>, EngineError> {
        let summaries = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                filters: label_filter(&[("name", name.to_string())]),
                ..Default::default()
            }))
            .await?;

        let wanted = format!("/{name}");
        Ok(summaries.into_iter().find_map(|summary| {
            let exact = summary
                .names
                .as_ref()
                .is_some_and(|names| names.iter().any(|n| *n == wanted));
            match (exact, summary.id) {
                (true, Some(id)) => Some((id, summary.state.unwrap_or_default())),
                _ => None,
            }
        }))
    }

    async fn pull(&self, image: &str) -> Result<(), EngineError> {
        let mut stream = self.docker.create_image(
            Some(CreateImageOptions {
                from_image: image,
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = stream.next().await {
            progress?;
        }
        tracing::debug!(image, "image pulled");
        Ok(())
    }

    async fn start_or_create(&self, network_id: &str, spec: ContainerSpec) -> Result<String, EngineError> {
        if let Some((id, state)) = self.find_by_name(&spec.name).await? {
            if state != "running" {
                tracing::info!(container = %spec.name, "starting existing container");
                self.docker
                    .start_container(&id, None::<StartContainerOptions<String>>)
                    .await?;
            }
            return Ok(id);
        }

        self.pull(&spec.image).await?;

        let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = spec
            .ports
            .iter()
            .map(|(container, host)| {
                (
                    container.clone(),
                    Some(vec![PortBinding {
                        host_ip: Some("127.0.0.1".to_string()),
                        host_port: Some(host.clone()),
                    }]),
                )
            })
            .collect();
        let exposed_ports: HashMap<String, HashMap<(), ()>> = spec
            .ports
            .iter()
            .map(|(container, _)| (container.clone(), HashMap::new()))
            .collect();

        let mut endpoints = HashMap::new();
        endpoints.insert(
            NETWORK_NAME.to_string(),
            EndpointSettings {
                network_id: Some(network_id.to_string()),
                aliases: Some(spec.aliases.clone()),
                ..Default::default()
            },
        );

        let config = ContainerConfig {
            image: Some(spec.image.clone()),
            env: Some(spec.env.clone()),
            labels: Some(spec.labels.clone()),
            cmd: spec.cmd.clone(),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                binds: Some(spec.binds.clone()),
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            networking_config: Some(NetworkingConfig {
                endpoints_config: endpoints,
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(
                Some(CreateContainerOptions {
                    name: spec.name.clone(),
                    platform: None,
                }),
                config,
            )
            .await?;
        self.docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await?;

        tracing::info!(container = %spec.name, image = %spec.image, "created container");
        Ok(created.id)
    }
}

#[async_trait]
impl Provisioner for DockerProvisioner {
    async fn database(&self, network_id: &str, database: &Database) -> Result<String, EngineError> {
        self.start_or_create(network_id, database_spec(database)).await
    }

    async fn mount(&self, network_id: &str, mount: &Mount) -> Result<String, EngineError> {
        self.start_or_create(network_id, mount_spec(mount)).await
    }

    async fn service(
        &self,
        network_id: &str,
        kind: ServiceKind,
    ) -> Result<Option<String>, EngineError> {
        self.start_or_create(network_id, service_spec(kind))
            .await
            .map(Some)
    }

    async fn site(&self, network_id: &str, site: &Site) -> Result<String, EngineError> {
        self.start_or_create(network_id, site_spec(site, &self.site_env))
            .await
    }
}
