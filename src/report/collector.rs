//! Recommendation collection for one namespace.

use tracing::{debug, info, warn};

use super::drift::{find_container, HpaIndex, ResourceDrift};
use super::ReportRow;
use crate::cluster::{ClusterClient, WorkloadLookup};
use crate::error::Result;
use crate::quantity::format_mebibytes;

/// Builds one row per (VPA, container) for every VPA in `namespace` whose
/// target still exists.
///
/// HPAs are listed once up front. A VPA pointing at a deleted workload is
/// skipped without error; one pointing at a kind that cannot be introspected
/// is reported with both current requests unset.
pub async fn collect_namespace(
    client: &dyn ClusterClient,
    namespace: &str,
) -> Result<Vec<ReportRow>> {
    debug!("Processing namespace {}", namespace);

    let hpas = HpaIndex::new(&client.list_hpa_targets(namespace).await?);
    let vpas = client.list_vpas(namespace).await?;
    debug!("Found {} VPAs in namespace {}", vpas.len(), namespace);

    let mut rows = Vec::new();
    for vpa in vpas {
        let Some(target) = vpa.target else {
            warn!("VPA {}/{} has no targetRef. Skipping", namespace, vpa.name);
            continue;
        };

        let containers = match client
            .get_workload(namespace, &target.kind, &target.name)
            .await?
        {
            WorkloadLookup::Missing => {
                info!(
                    "Target {} {} of VPA {}/{} does not exist. Skipping",
                    target.kind, target.name, namespace, vpa.name
                );
                continue;
            }
            WorkloadLookup::Opaque => Vec::new(),
            WorkloadLookup::Found(containers) => containers,
        };

        let hpa_enabled = hpas.covers(&target);

        for rec in &vpa.recommendations {
            let current = find_container(&containers, &rec.container_name);
            let drift = ResourceDrift::compute(rec, current);

            debug!(
                "Container {} of {} {}: current cpu={}m memory={}B, recommended cpu={}m memory={}B, hpa={}",
                rec.container_name,
                target.kind,
                target.name,
                drift.current_cpu_milli,
                drift.current_mem_bytes,
                rec.cpu_milli,
                rec.memory_bytes,
                hpa_enabled
            );

            rows.push(ReportRow {
                namespace: namespace.to_string(),
                resource_type: target.kind.clone(),
                resource_name: target.name.clone(),
                container_name: rec.container_name.clone(),
                vpa_name: vpa.name.clone(),
                target_cpu: rec.cpu.clone(),
                target_memory: format_mebibytes(rec.memory_bytes),
                drift,
                hpa_enabled,
            });
        }
    }

    Ok(rows)
}
