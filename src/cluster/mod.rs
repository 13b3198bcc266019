//! Cluster access for the rightsizing jobs
//!
//! The jobs never talk to `kube` directly. They go through the
//! [`ClusterClient`] capability, which returns the small projections defined
//! here rather than full API objects. [`KubeCluster`] is the production
//! implementation; tests use an in-memory fake.

mod kube_client;
pub mod vpa;
pub mod workloads;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

pub use kube_client::KubeCluster;
pub use workloads::{WorkloadKind, WorkloadRegistry, ENUMERATED_KINDS};

/// API version used for the built-in workload controllers.
pub const APPS_API_VERSION: &str = "apps/v1";

/// One entry of a workload's `metadata.ownerReferences`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub controller: bool,
}

/// A workload found by enumeration, with its owner chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadRef {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub owners: Vec<OwnerRef>,
}

/// The object a VPA points its `targetRef` at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VpaTarget {
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

impl VpaTarget {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for VpaTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.kind, self.name, self.api_version)
    }
}

/// Uncapped target for a single container, as reported in VPA status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRecommendation {
    pub container_name: String,
    pub cpu_milli: i64,
    /// CPU exactly as the API rendered it, e.g. `"25m"`
    pub cpu: String,
    pub memory_bytes: i64,
}

/// Projection of an existing `VerticalPodAutoscaler`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VpaRecord {
    pub name: String,
    pub namespace: String,
    /// `None` when the object has no `spec.targetRef`
    pub target: Option<VpaTarget>,
    pub update_mode: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub recommendations: Vec<ContainerRecommendation>,
}

/// `spec.scaleTargetRef` of a HorizontalPodAutoscaler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaleTarget {
    pub kind: String,
    pub name: String,
}

/// Resource requests configured on one container of a pod template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerRequests {
    pub name: String,
    pub cpu_milli: Option<i64>,
    pub memory_bytes: Option<i64>,
}

/// Result of fetching a workload by kind and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkloadLookup {
    /// The API answered 404
    Missing,
    /// The kind has no registered introspection; assumed to exist
    Opaque,
    /// The workload exists; containers of its pod template
    Found(Vec<ContainerRequests>),
}

/// Everything the two jobs need from the cluster.
///
/// Any failure is surfaced as a `ClusterQueryError` (reads) or
/// `ClusterWriteError` (VPA creation).
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// Lists workloads of one kind, in API order.
    async fn list_workloads(&self, namespace: &str, kind: &str) -> Result<Vec<WorkloadRef>>;

    async fn get_workload(&self, namespace: &str, kind: &str, name: &str)
        -> Result<WorkloadLookup>;

    async fn list_hpa_targets(&self, namespace: &str) -> Result<Vec<ScaleTarget>>;

    async fn list_vpas(&self, namespace: &str) -> Result<Vec<VpaRecord>>;

    async fn create_vpa(&self, namespace: &str, vpa: &VpaRecord) -> Result<()>;
}
