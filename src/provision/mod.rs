//! Provisioning job: give every workload controller a recommendation-only VPA.
//!
//! Per namespace: enumerate workloads, resolve each to the controller a VPA
//! must target, then create VPAs for targets that have none yet.

mod enumerate;
mod owner;
mod reconcile;

use tracing::{debug, info};

use crate::cluster::{ClusterClient, VpaTarget};
use crate::error::Result;

pub use enumerate::enumerate_workloads;
pub use owner::resolve;
pub use reconcile::{dedup_targets, find_existing, reconcile, ReconcileOutcome};

/// Totals across all namespaces of one provisioning run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub namespaces: usize,
    pub workloads: usize,
    pub created: Vec<String>,
    pub skipped: usize,
}

/// Provisions a single namespace.
pub async fn provision_namespace(
    client: &dyn ClusterClient,
    namespace: &str,
) -> Result<(usize, ReconcileOutcome)> {
    debug!("Processing namespace {}", namespace);

    let workloads = enumerate_workloads(client, namespace).await?;
    let desired: Vec<VpaTarget> = workloads.iter().map(resolve).collect();

    let existing = client.list_vpas(namespace).await?;
    debug!("Found {} VPAs in namespace {}", existing.len(), namespace);

    let outcome = reconcile(client, namespace, &desired, &existing).await?;
    Ok((workloads.len(), outcome))
}

/// Runs the provisioning job over `namespaces`, stopping at the first error.
pub async fn run(client: &dyn ClusterClient, namespaces: &[String]) -> Result<ProvisionSummary> {
    let mut summary = ProvisionSummary::default();

    for namespace in namespaces {
        let (workloads, outcome) = provision_namespace(client, namespace).await?;
        summary.namespaces += 1;
        summary.workloads += workloads;
        summary.skipped += outcome.skipped;
        summary.created.extend(outcome.created);
    }

    info!(
        "Provisioning complete: {} namespaces, {} workloads, {} VPAs created, {} already present",
        summary.namespaces,
        summary.workloads,
        summary.created.len(),
        summary.skipped
    );
    Ok(summary)
}
