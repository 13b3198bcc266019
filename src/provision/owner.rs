//! Owner resolution for VPA targets.
//!
//! A VPA may only target a top-level controller. When a workload is itself
//! managed by another object (a StatefulSet created by a Prometheus
//! operator, say) the VPA has to point at that controlling owner instead.

use tracing::debug;

use crate::cluster::{VpaTarget, WorkloadRef, APPS_API_VERSION};

/// Returns the object a VPA for `workload` must reference.
///
/// The first owner reference with `controller: true` wins; the API allows
/// only one, so later entries are not inspected. Exactly one level of
/// ownership is resolved. Without a controlling owner the workload targets
/// itself under `apps/v1`.
pub fn resolve(workload: &WorkloadRef) -> VpaTarget {
    match workload.owners.iter().find(|o| o.controller) {
        Some(owner) => {
            debug!(
                "{} {}/{} is controlled by {} {} ({})",
                workload.kind,
                workload.namespace,
                workload.name,
                owner.kind,
                owner.name,
                owner.api_version
            );
            VpaTarget::new(&owner.api_version, &owner.kind, &owner.name)
        }
        None => VpaTarget::new(APPS_API_VERSION, &workload.kind, &workload.name),
    }
}
