//! Workload enumeration for a namespace.

use tracing::debug;

use crate::cluster::{ClusterClient, WorkloadRef, ENUMERATED_KINDS};
use crate::error::Result;

/// Lists Deployments, then StatefulSets, then DaemonSets, preserving API
/// order within each kind. Any failed listing aborts the namespace.
pub async fn enumerate_workloads(
    client: &dyn ClusterClient,
    namespace: &str,
) -> Result<Vec<WorkloadRef>> {
    let mut workloads = Vec::new();
    for kind in ENUMERATED_KINDS {
        let found = client.list_workloads(namespace, kind).await?;
        debug!(
            "Found {} {} objects in namespace {}",
            found.len(),
            kind,
            namespace
        );
        workloads.extend(found);
    }
    Ok(workloads)
}
