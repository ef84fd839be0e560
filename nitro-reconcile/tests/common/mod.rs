//! In-memory collaborators shared by the reconcile tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use nitro_core::{
    labels, ContainerRecord, Database, DatabaseCompatibility, Mount, NetworkRecord, ServiceKind,
    Site,
};
use nitro_engine::{BackupRequest, ContainerEngine, DatabaseBackup, EngineError, Provisioner};
use nitro_proxy::{ProxyApi, ProxyError, ProxyResponse, SiteMap};
use nitro_reconcile::{HostsEditor, ReconcileError, Reporter};

/// Every call any fake receives, in order.
pub type Calls = Mutex<Vec<String>>;

pub fn record(calls: &Calls, call: impl Into<String>) {
    calls.lock().unwrap().push(call.into());
}

pub fn container(id: &str, name: &str, pairs: &[(&str, &str)]) -> ContainerRecord {
    let mut labels: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    labels.insert(labels::MANAGED.to_string(), "true".to_string());
    ContainerRecord::new(id, format!("/{name}"), "running", &labels)
}

pub fn proxy_container() -> ContainerRecord {
    container("proxy-id", "nitro-proxy", &[(labels::PROXY, "true")])
}

pub fn database_container(id: &str, name: &str, compatibility: &str) -> ContainerRecord {
    container(
        id,
        name,
        &[
            (labels::DATABASE_ENGINE, compatibility),
            (labels::DATABASE_COMPATIBILITY, compatibility),
        ],
    )
}

#[derive(Default)]
pub struct FakeEngine {
    pub network: Option<NetworkRecord>,
    pub containers: Vec<ContainerRecord>,
    pub fail_stop: HashSet<String>,
    pub fail_remove: HashSet<String>,
    pub calls: Calls,
}

impl FakeEngine {
    pub fn with_network(containers: Vec<ContainerRecord>) -> Self {
        Self {
            network: Some(NetworkRecord {
                id: "net-1".to_string(),
                name: "nitro-network".to_string(),
            }),
            containers,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn list_managed(&self) -> Result<Vec<ContainerRecord>, EngineError> {
        record(&self.calls, "list");
        Ok(self.containers.clone())
    }

    async fn find_network(&self, name: &str) -> Result<Option<NetworkRecord>, EngineError> {
        record(&self.calls, format!("network {name}"));
        Ok(self.network.clone())
    }

    async fn start(&self, id: &str) -> Result<(), EngineError> {
        record(&self.calls, format!("start {id}"));
        Ok(())
    }

    async fn stop(&self, id: &str) -> Result<(), EngineError> {
        record(&self.calls, format!("stop {id}"));
        if self.fail_stop.contains(id) {
            return Err(EngineError::Exec {
                container: id.to_string(),
                command: "stop".to_string(),
                code: 1,
                stderr: "engine unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), EngineError> {
        record(&self.calls, format!("remove {id}"));
        if self.fail_remove.contains(id) {
            return Err(EngineError::Exec {
                container: id.to_string(),
                command: "remove".to_string(),
                code: 1,
                stderr: "device or resource busy".to_string(),
            });
        }
        Ok(())
    }
}

/// Lists a fixed set of databases per container id.
#[derive(Default)]
pub struct FakeBackup {
    pub databases: HashMap<String, Vec<String>>,
    /// Container ids whose listing fails.
    pub unlistable: HashSet<String>,
    /// Database names whose dump fails.
    pub failing: HashSet<String>,
    pub requests: Mutex<Vec<BackupRequest>>,
}

fn exec_failure(container: &str, stderr: &str) -> EngineError {
    EngineError::Exec {
        container: container.to_string(),
        command: "dump".to_string(),
        code: 2,
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl DatabaseBackup for FakeBackup {
    async fn list_databases(
        &self,
        container_id: &str,
        _compatibility: DatabaseCompatibility,
    ) -> Result<Vec<String>, EngineError> {
        if self.unlistable.contains(container_id) {
            return Err(exec_failure(container_id, "access denied"));
        }
        Ok(self.databases.get(container_id).cloned().unwrap_or_default())
    }

    async fn perform(&self, request: &BackupRequest) -> Result<PathBuf, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.contains(&request.database) {
            return Err(exec_failure(&request.container_id, "dump failed"));
        }
        Ok(request.host_path())
    }
}

/// Hands out `<kind>-<name>` ids and optionally fails one resource.
#[derive(Default)]
pub struct FakeProvisioner {
    pub fail_on: Option<String>,
    pub calls: Calls,
}

impl FakeProvisioner {
    fn provide(&self, kind: &str, name: &str) -> Result<String, EngineError> {
        record(&self.calls, format!("{kind} {name}"));
        if self.fail_on.as_deref() == Some(name) {
            return Err(exec_failure(name, "image not found"));
        }
        Ok(format!("{kind}-{name}"))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    async fn database(&self, _network_id: &str, database: &Database) -> Result<String, EngineError> {
        self.provide("database", &database.hostname())
    }

    async fn mount(&self, _network_id: &str, mount: &Mount) -> Result<String, EngineError> {
        self.provide("mount", &mount.path.display().to_string())
    }

    async fn service(
        &self,
        _network_id: &str,
        kind: ServiceKind,
    ) -> Result<Option<String>, EngineError> {
        self.provide("service", kind.name()).map(Some)
    }

    async fn site(&self, _network_id: &str, site: &Site) -> Result<String, EngineError> {
        self.provide("site", &site.hostname)
    }
}

#[derive(Default)]
pub struct FakeProxy {
    pub pings: Mutex<u32>,
    pub applied: Mutex<Vec<SiteMap>>,
    /// Answer every apply with this error message.
    pub reject: Option<String>,
}

#[async_trait]
impl ProxyApi for FakeProxy {
    async fn ping(&self) -> Result<(), ProxyError> {
        *self.pings.lock().unwrap() += 1;
        Ok(())
    }

    async fn apply(&self, sites: &SiteMap) -> Result<ProxyResponse, ProxyError> {
        self.applied.lock().unwrap().push(sites.clone());
        match &self.reject {
            Some(message) => Ok(ProxyResponse::error(message.clone())),
            None => Ok(ProxyResponse::ok("applied")),
        }
    }
}

/// Writes straight to the file, no elevation.
#[derive(Default)]
pub struct DirectHosts {
    pub writes: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl HostsEditor for DirectHosts {
    async fn apply(
        &self,
        path: &Path,
        address: &str,
        hostnames: &[String],
    ) -> Result<(), ReconcileError> {
        self.writes.lock().unwrap().push(hostnames.to_vec());
        nitro_hosts::write_hosts(path, address, hostnames, false)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn warnings(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter_map(|l| l.strip_prefix("warning: ").map(str::to_string))
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        record(&self.lines, format!("info: {message}"));
    }
    fn pending(&self, message: &str) {
        record(&self.lines, format!("pending: {message}"));
    }
    fn done(&self) {
        record(&self.lines, "done");
    }
    fn warning(&self, message: &str) {
        record(&self.lines, format!("warning: {message}"));
    }
    fn success(&self, message: &str) {
        record(&self.lines, format!("success: {message}"));
    }
}
