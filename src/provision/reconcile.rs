//! Reconciles desired VPA targets against the VPAs already in a namespace.

use std::collections::HashSet;

use tracing::info;

use crate::cluster::{vpa, ClusterClient, VpaRecord, VpaTarget};
use crate::error::Result;

/// What a reconcile pass did in one namespace.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Names of the VPAs created, in creation order
    pub created: Vec<String>,
    /// Targets that already had a VPA
    pub skipped: usize,
}

/// Drops repeated targets, keeping the first occurrence.
///
/// Sibling workloads owned by the same controller resolve to the same
/// target and must yield a single VPA.
pub fn dedup_targets(desired: &[VpaTarget]) -> Vec<VpaTarget> {
    let mut seen = HashSet::new();
    desired
        .iter()
        .filter(|t| seen.insert(*t))
        .cloned()
        .collect()
}

/// Finds an existing VPA whose target matches exactly.
///
/// API version, kind and name are compared case-sensitively.
pub fn find_existing<'a>(target: &VpaTarget, existing: &'a [VpaRecord]) -> Option<&'a VpaRecord> {
    existing
        .iter()
        .find(|vpa| vpa.target.as_ref() == Some(target))
}

/// Creates a recommendation-only VPA for every desired target that has none.
///
/// Creation failures are returned immediately and are not retried.
pub async fn reconcile(
    client: &dyn ClusterClient,
    namespace: &str,
    desired: &[VpaTarget],
    existing: &[VpaRecord],
) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();

    for target in dedup_targets(desired) {
        if let Some(found) = find_existing(&target, existing) {
            info!(
                "Found existing VPA {} for {} {} in {}. Skipping",
                found.name, target.kind, target.name, namespace
            );
            outcome.skipped += 1;
            continue;
        }

        let record = vpa::desired_vpa(namespace, &target);
        client.create_vpa(namespace, &record).await?;
        info!("Created VPA {} in namespace {}", record.name, namespace);
        outcome.created.push(record.name);
    }

    Ok(outcome)
}
