//! Reporting job: harvest uncapped VPA recommendations into a CSV report.
//!
//! Each row joins a VPA's per-container recommendation with the requests
//! currently configured on the target workload and whether an HPA already
//! scales the same target.

mod collector;
mod drift;
mod writer;

use tracing::info;

use crate::cluster::ClusterClient;
use crate::error::Result;

pub use collector::collect_namespace;
pub use drift::{find_container, HpaIndex, ResourceDrift, NOT_SET};
pub use writer::{write_report, write_rows, HEADER, RESULTS_FILE};

/// One (VPA, container) line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub namespace: String,
    pub resource_type: String,
    pub resource_name: String,
    pub container_name: String,
    pub vpa_name: String,
    /// Uncapped CPU target as rendered by the API
    pub target_cpu: String,
    /// Uncapped memory target in whole mebibytes
    pub target_memory: String,
    pub drift: ResourceDrift,
    pub hpa_enabled: bool,
}

impl ReportRow {
    /// CSV fields, in [`HEADER`] order.
    pub fn record(&self) -> [String; 11] {
        [
            self.namespace.clone(),
            self.resource_type.clone(),
            self.resource_name.clone(),
            self.container_name.clone(),
            self.target_cpu.clone(),
            self.target_memory.clone(),
            self.drift.current_cpu(),
            self.drift.current_memory(),
            self.drift.cpu_diff.to_string(),
            self.drift.mem_diff.to_string(),
            self.hpa_enabled.to_string(),
        ]
    }
}

/// Collects rows for every namespace in order, stopping at the first error.
pub async fn run(client: &dyn ClusterClient, namespaces: &[String]) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();
    for namespace in namespaces {
        rows.extend(collect_namespace(client, namespace).await?);
    }
    info!("Collected {} container recommendations", rows.len());
    Ok(rows)
}
