//! Per-kind workload access
//!
//! Listing and fetching a workload is the same for every controller kind that
//! embeds a pod template; only the path to the `PodSpec` differs. Each
//! supported kind is one [`PodTemplateWorkload`] impl, and the
//! [`WorkloadRegistry`] dispatches on the kind string reported by the API
//! (`targetRef.kind`, exact match). Supporting a new kind means adding one
//! impl and one `register` call.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Container, PodSpec};
use kube::{
    api::{Api, ListParams},
    core::NamespaceResourceScope,
    Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ContainerRequests, OwnerRef, WorkloadLookup, WorkloadRef};
use crate::error::{is_not_found, Error, Result};
use crate::quantity;

/// Kinds enumerated by the provisioning job, in enumeration order.
pub const ENUMERATED_KINDS: [&str; 3] = [
    <Deployment as k8s_openapi::Resource>::KIND,
    <StatefulSet as k8s_openapi::Resource>::KIND,
    <DaemonSet as k8s_openapi::Resource>::KIND,
];

/// A namespaced controller that carries a pod template.
pub trait PodTemplateWorkload:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    fn pod_spec(&self) -> Option<&PodSpec>;
}

impl PodTemplateWorkload for Deployment {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|s| s.template.spec.as_ref())
    }
}

impl PodTemplateWorkload for StatefulSet {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|s| s.template.spec.as_ref())
    }
}

impl PodTemplateWorkload for DaemonSet {
    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(|s| s.template.spec.as_ref())
    }
}

/// Kind-erased access to one workload kind.
#[async_trait]
pub trait WorkloadKind: Send + Sync {
    fn kind(&self) -> &str;

    async fn list(&self, client: &Client, namespace: &str) -> Result<Vec<WorkloadRef>>;

    async fn get(&self, client: &Client, namespace: &str, name: &str) -> Result<WorkloadLookup>;
}

struct TypedWorkload<K> {
    kind: String,
    api_version: String,
    _marker: PhantomData<fn() -> K>,
}

impl<K: PodTemplateWorkload> TypedWorkload<K> {
    fn new() -> Self {
        Self {
            kind: K::kind(&()).into_owned(),
            api_version: K::api_version(&()).into_owned(),
            _marker: PhantomData,
        }
    }

    fn to_ref(&self, obj: &K, namespace: &str) -> WorkloadRef {
        WorkloadRef {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: obj.name_any(),
            namespace: namespace.to_string(),
            owners: obj
                .owner_references()
                .iter()
                .map(|o| OwnerRef {
                    api_version: o.api_version.clone(),
                    kind: o.kind.clone(),
                    name: o.name.clone(),
                    controller: o.controller.unwrap_or(false),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl<K: PodTemplateWorkload> WorkloadKind for TypedWorkload<K> {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn list(&self, client: &Client, namespace: &str) -> Result<Vec<WorkloadRef>> {
        let api: Api<K> = Api::namespaced(client.clone(), namespace);
        let items = api.list(&ListParams::default()).await.map_err(|e| {
            Error::query(
                format!("listing {} objects in {} namespace", self.kind, namespace),
                e,
            )
        })?;
        debug!(
            "Found {} {} objects in namespace {}",
            items.items.len(),
            self.kind,
            namespace
        );
        Ok(items
            .items
            .iter()
            .map(|obj| self.to_ref(obj, namespace))
            .collect())
    }

    async fn get(&self, client: &Client, namespace: &str, name: &str) -> Result<WorkloadLookup> {
        let api: Api<K> = Api::namespaced(client.clone(), namespace);
        into_lookup(api.get(name).await, || {
            format!("getting {} {}/{}", self.kind, namespace, name)
        })
    }
}

/// Maps a fetched workload to a lookup; a 404 means the workload is gone.
fn into_lookup<K: PodTemplateWorkload>(
    fetched: kube::Result<K>,
    context: impl FnOnce() -> String,
) -> Result<WorkloadLookup> {
    match fetched {
        Ok(obj) => {
            let containers = obj
                .pod_spec()
                .map(|spec| container_requests(&spec.containers))
                .transpose()?
                .unwrap_or_default();
            Ok(WorkloadLookup::Found(containers))
        }
        Err(e) if is_not_found(&e) => Ok(WorkloadLookup::Missing),
        Err(e) => Err(Error::query(context(), e)),
    }
}

/// Extracts the CPU and memory requests of each container.
pub fn container_requests(containers: &[Container]) -> Result<Vec<ContainerRequests>> {
    containers
        .iter()
        .map(|c| -> Result<ContainerRequests> {
            let requests = c.resources.as_ref().and_then(|r| r.requests.as_ref());
            let cpu_milli = requests
                .and_then(|r| r.get("cpu"))
                .map(|q| quantity::milli_value(&q.0))
                .transpose()?;
            let memory_bytes = requests
                .and_then(|r| r.get("memory"))
                .map(|q| quantity::value(&q.0))
                .transpose()?;
            Ok(ContainerRequests {
                name: c.name.clone(),
                cpu_milli,
                memory_bytes,
            })
        })
        .collect()
}

/// Maps kind strings to their [`WorkloadKind`] handler.
pub struct WorkloadRegistry {
    kinds: Vec<Box<dyn WorkloadKind>>,
}

impl WorkloadRegistry {
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    pub fn register<K: PodTemplateWorkload>(mut self) -> Self {
        self.kinds.push(Box::new(TypedWorkload::<K>::new()));
        self
    }

    pub fn lookup(&self, kind: &str) -> Option<&dyn WorkloadKind> {
        self.kinds
            .iter()
            .find(|k| k.kind() == kind)
            .map(|k| k.as_ref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|k| k.kind())
    }
}

impl Default for WorkloadRegistry {
    fn default() -> Self {
        Self::empty()
            .register::<Deployment>()
            .register::<StatefulSet>()
            .register::<DaemonSet>()
    }
}
