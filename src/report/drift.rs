//! Drift between a VPA recommendation and the configured requests.

use std::collections::HashSet;

use crate::cluster::{ContainerRecommendation, ContainerRequests, ScaleTarget, VpaTarget};
use crate::quantity::{format_mebibytes, format_millicores, MEBIBYTE};

/// Rendered in place of a request that is not configured.
pub const NOT_SET: &str = "NOT_SET";

/// Current requests of one container and their distance from the
/// recommendation.
///
/// An unset request is tracked by the `*_set` flags, never by a zero value,
/// and its diff stays 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceDrift {
    pub current_cpu_milli: i64,
    pub current_mem_bytes: i64,
    /// recommended - current, in millicores
    pub cpu_diff: i64,
    /// recommended - current, in bytes
    pub mem_diff: i64,
    pub cpu_set: bool,
    pub mem_set: bool,
}

impl ResourceDrift {
    /// `current` is the matching container of the live pod template, if any.
    ///
    /// A CPU request of zero counts as unset, as does a memory request that
    /// is below one mebibyte (it would render as `0Mi`).
    pub fn compute(
        recommendation: &ContainerRecommendation,
        current: Option<&ContainerRequests>,
    ) -> Self {
        let mut drift = ResourceDrift::default();
        let Some(current) = current else {
            return drift;
        };

        if let Some(cpu) = current.cpu_milli.filter(|&m| m != 0) {
            drift.cpu_set = true;
            drift.current_cpu_milli = cpu;
            drift.cpu_diff = recommendation.cpu_milli - cpu;
        }

        if let Some(mem) = current.memory_bytes.filter(|&b| b / MEBIBYTE != 0) {
            drift.mem_set = true;
            drift.current_mem_bytes = mem;
            drift.mem_diff = recommendation.memory_bytes - mem;
        }

        drift
    }

    pub fn current_cpu(&self) -> String {
        if self.cpu_set {
            format_millicores(self.current_cpu_milli)
        } else {
            NOT_SET.to_string()
        }
    }

    pub fn current_memory(&self) -> String {
        if self.mem_set {
            format_mebibytes(self.current_mem_bytes)
        } else {
            NOT_SET.to_string()
        }
    }
}

/// Finds a container by name, ignoring case.
pub fn find_container<'a>(
    containers: &'a [ContainerRequests],
    name: &str,
) -> Option<&'a ContainerRequests> {
    containers
        .iter()
        .find(|c| c.name.to_lowercase() == name.to_lowercase())
}

/// Scale targets of every HPA in a namespace, matched ignoring case.
#[derive(Debug, Default)]
pub struct HpaIndex {
    targets: HashSet<(String, String)>,
}

impl HpaIndex {
    pub fn new(targets: &[ScaleTarget]) -> Self {
        Self {
            targets: targets
                .iter()
                .map(|t| (t.kind.to_lowercase(), t.name.to_lowercase()))
                .collect(),
        }
    }

    pub fn covers(&self, target: &VpaTarget) -> bool {
        self.targets
            .contains(&(target.kind.to_lowercase(), target.name.to_lowercase()))
    }
}
