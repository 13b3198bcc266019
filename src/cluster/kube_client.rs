//! `ClusterClient` backed by a live API server.

use async_trait::async_trait;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{Api, DynamicObject, ListParams, PostParams},
    Client, ResourceExt,
};
use tracing::debug;

use super::vpa::{from_dynamic, to_dynamic, vpa_api_resource};
use super::{ClusterClient, ScaleTarget, VpaRecord, WorkloadLookup, WorkloadRef, WorkloadRegistry};
use crate::error::{Error, Result};

pub struct KubeCluster {
    client: Client,
    registry: WorkloadRegistry,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self::with_registry(client, WorkloadRegistry::default())
    }

    pub fn with_registry(client: Client, registry: WorkloadRegistry) -> Self {
        Self { client, registry }
    }

    fn vpa_api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &vpa_api_resource())
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::query("listing namespaces", e))?;
        Ok(namespaces.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_workloads(&self, namespace: &str, kind: &str) -> Result<Vec<WorkloadRef>> {
        let handler = self.registry.lookup(kind).ok_or_else(|| {
            Error::ConfigError(format!("no workload handler registered for kind {}", kind))
        })?;
        handler.list(&self.client, namespace).await
    }

    async fn get_workload(
        &self,
        namespace: &str,
        kind: &str,
        name: &str,
    ) -> Result<WorkloadLookup> {
        match self.registry.lookup(kind) {
            Some(handler) => handler.get(&self.client, namespace, name).await,
            None => {
                debug!(
                    "No introspection for kind {}; assuming {}/{} exists",
                    kind, namespace, name
                );
                Ok(WorkloadLookup::Opaque)
            }
        }
    }

    async fn list_hpa_targets(&self, namespace: &str) -> Result<Vec<ScaleTarget>> {
        let api: Api<HorizontalPodAutoscaler> = Api::namespaced(self.client.clone(), namespace);
        let hpas = api
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::query(format!("listing HPAs in {} namespace", namespace), e))?;
        Ok(hpas
            .items
            .into_iter()
            .filter_map(|hpa| hpa.spec)
            .map(|spec| ScaleTarget {
                kind: spec.scale_target_ref.kind,
                name: spec.scale_target_ref.name,
            })
            .collect())
    }

    async fn list_vpas(&self, namespace: &str) -> Result<Vec<VpaRecord>> {
        let vpas = self
            .vpa_api(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| Error::query(format!("listing VPAs in {} namespace", namespace), e))?;
        debug!("Found {} VPAs in namespace {}", vpas.items.len(), namespace);
        vpas.items
            .iter()
            .map(|obj| from_dynamic(obj, namespace))
            .collect()
    }

    async fn create_vpa(&self, namespace: &str, vpa: &VpaRecord) -> Result<()> {
        let obj = to_dynamic(vpa);
        self.vpa_api(namespace)
            .create(&PostParams::default(), &obj)
            .await
            .map_err(|e| Error::write(format!("creating VPA {}/{}", namespace, vpa.name), e))?;
        Ok(())
    }
}
