//! In-memory `ClusterClient` for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use kube::error::ErrorResponse;

use super::{
    ClusterClient, ContainerRequests, OwnerRef, ScaleTarget, VpaRecord, WorkloadLookup,
    WorkloadRef, APPS_API_VERSION,
};
use crate::error::{Error, Result};

fn api_error(code: u16, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "InternalError".to_string(),
        code,
    })
}

#[derive(Default)]
struct State {
    namespaces: Vec<String>,
    workloads: Vec<WorkloadRef>,
    containers: HashMap<(String, String, String), Vec<ContainerRequests>>,
    opaque_kinds: Vec<String>,
    hpas: HashMap<String, Vec<ScaleTarget>>,
    vpas: HashMap<String, Vec<VpaRecord>>,
    created: Vec<VpaRecord>,
    fail_list_namespaces: bool,
    fail_list_kind: Option<String>,
    fail_create: bool,
    fail_get: bool,
    fail_list_vpas: bool,
    fail_list_hpas: bool,
    calls: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn namespace(self, name: &str) -> Self {
        self.with(|s| s.namespaces.push(name.to_string()));
        self
    }

    /// Adds a workload with the given owner chain and pod template.
    pub fn workload(
        self,
        namespace: &str,
        kind: &str,
        name: &str,
        owners: Vec<OwnerRef>,
        containers: Vec<ContainerRequests>,
    ) -> Self {
        self.with(|s| {
            s.workloads.push(WorkloadRef {
                api_version: APPS_API_VERSION.to_string(),
                kind: kind.to_string(),
                name: name.to_string(),
                namespace: namespace.to_string(),
                owners,
            });
            s.containers.insert(
                (namespace.to_string(), kind.to_string(), name.to_string()),
                containers,
            );
        });
        self
    }

    /// Marks a kind as existing but not introspectable.
    pub fn opaque_kind(self, kind: &str) -> Self {
        self.with(|s| s.opaque_kinds.push(kind.to_string()));
        self
    }

    pub fn hpa(self, namespace: &str, kind: &str, name: &str) -> Self {
        self.with(|s| {
            s.hpas
                .entry(namespace.to_string())
                .or_default()
                .push(ScaleTarget {
                    kind: kind.to_string(),
                    name: name.to_string(),
                })
        });
        self
    }

    pub fn vpa(self, record: VpaRecord) -> Self {
        self.with(|s| {
            s.vpas
                .entry(record.namespace.clone())
                .or_default()
                .push(record)
        });
        self
    }

    pub fn failing_namespace_list(self) -> Self {
        self.with(|s| s.fail_list_namespaces = true);
        self
    }

    pub fn failing_list_of(self, kind: &str) -> Self {
        self.with(|s| s.fail_list_kind = Some(kind.to_string()));
        self
    }

    pub fn failing_create(self) -> Self {
        self.with(|s| s.fail_create = true);
        self
    }

    /// Every `get_workload` answers 500.
    pub fn failing_get(self) -> Self {
        self.with(|s| s.fail_get = true);
        self
    }

    pub fn failing_vpa_list(self) -> Self {
        self.with(|s| s.fail_list_vpas = true);
        self
    }

    pub fn failing_hpa_list(self) -> Self {
        self.with(|s| s.fail_list_hpas = true);
        self
    }

    pub fn created(&self) -> Vec<VpaRecord> {
        self.with(|s| s.created.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.with(|s| {
            s.calls.push("list_namespaces".to_string());
            if s.fail_list_namespaces {
                return Err(Error::query(
                    "listing namespaces",
                    api_error(500, "etcd unavailable"),
                ));
            }
            Ok(s.namespaces.clone())
        })
    }

    async fn list_workloads(&self, namespace: &str, kind: &str) -> Result<Vec<WorkloadRef>> {
        self.with(|s| {
            s.calls.push(format!("list_workloads {} {}", namespace, kind));
            if s.fail_list_kind.as_deref() == Some(kind) {
                return Err(Error::query(
                    format!("listing {} objects in {} namespace", kind, namespace),
                    api_error(500, "timeout"),
                ));
            }
            Ok(s.workloads
                .iter()
                .filter(|w| w.namespace == namespace && w.kind == kind)
                .cloned()
                .collect())
        })
    }

    async fn get_workload(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<WorkloadLookup> {
        self.with(|s| {
            s.calls.push(format!("get_workload {} {} {}", namespace, kind, name));
            if s.fail_get {
                return Err(Error::query(
                    format!("getting {} {}/{}", kind, namespace, name),
                    api_error(500, "apiserver unavailable"),
                ));
            }
            if s.opaque_kinds.iter().any(|k| k == kind) {
                return Ok(WorkloadLookup::Opaque);
            }
            let key = (namespace.to_string(), kind.to_string(), name.to_string());
            Ok(match s.containers.get(&key) {
                Some(containers) => WorkloadLookup::Found(containers.clone()),
                None => WorkloadLookup::Missing,
            })
        })
    }

    async fn list_hpa_targets(&self, namespace: &str) -> Result<Vec<ScaleTarget>> {
        self.with(|s| {
            s.calls.push(format!("list_hpa_targets {}", namespace));
            if s.fail_list_hpas {
                return Err(Error::query(
                    format!("listing HPAs in {} namespace", namespace),
                    api_error(500, "timeout"),
                ));
            }
            Ok(s.hpas.get(namespace).cloned().unwrap_or_default())
        })
    }

    async fn list_vpas(&self, namespace: &str) -> Result<Vec<VpaRecord>> {
        self.with(|s| {
            s.calls.push(format!("list_vpas {}", namespace));
            if s.fail_list_vpas {
                return Err(Error::query(
                    format!("listing VPAs in {} namespace", namespace),
                    api_error(500, "timeout"),
                ));
            }
            Ok(s.vpas.get(namespace).cloned().unwrap_or_default())
        })
    }

    async fn create_vpa(&self, namespace: &str, vpa: &VpaRecord) -> Result<()> {
        self.with(|s| {
            s.calls.push(format!("create_vpa {} {}", namespace, vpa.name));
            if s.fail_create {
                return Err(Error::write(
                    format!("creating VPA {}/{}", namespace, vpa.name),
                    api_error(403, "forbidden"),
                ));
            }
            s.created.push(vpa.clone());
            s.vpas
                .entry(namespace.to_string())
                .or_default()
                .push(vpa.clone());
            Ok(())
        })
    }
}

/// A controlling owner reference.
pub fn controller(api_version: &str, kind: &str, name: &str) -> OwnerRef {
    OwnerRef {
        api_version: api_version.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        controller: true,
    }
}

pub fn requests(name: &str, cpu_milli: Option<i64>, memory_bytes: Option<i64>) -> ContainerRequests {
    ContainerRequests {
        name: name.to_string(),
        cpu_milli,
        memory_bytes,
    }
}
