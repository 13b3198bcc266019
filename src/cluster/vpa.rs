//! VerticalPodAutoscaler object encoding.
//!
//! The VPA CRD lives in API group `autoscaling.k8s.io/v1`. Because
//! `k8s-openapi` does not ship VPA types the objects travel as kube's
//! `DynamicObject`; the fields this crate cares about are decoded into the
//! private serde structs below and projected into a [`VpaRecord`].
//!
//! # Created objects
//! - **Name**: `<target-name>-vpa-8dn39`. The fixed suffix keeps generated
//!   names apart from hand-authored or source-controlled VPAs.
//! - **Labels**: marked as script-managed so they can be removed in bulk
//!   with `kubectl delete vpa -l managed-by=vpa-recommendations-script`.
//! - **Update mode**: always `Off`. Recommendations are only ever read.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::{
    api::{ApiResource, DynamicObject, GroupVersionKind},
    core::ObjectMeta,
};
use serde::Deserialize;
use serde_json::json;

use super::{ContainerRecommendation, VpaRecord, VpaTarget};
use crate::error::Result;
use crate::quantity;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const VPA_GROUP: &str = "autoscaling.k8s.io";
const VPA_VERSION: &str = "v1";
const VPA_KIND: &str = "VerticalPodAutoscaler";

/// Appended to every generated VPA name.
pub const VPA_NAME_SUFFIX: &str = "8dn39";

/// Recommendation-only mode. Not configurable.
pub const UPDATE_MODE_OFF: &str = "Off";

pub const MANAGED_BY_LABEL: &str = "managed-by";
pub const MANAGED_BY_VALUE: &str = "vpa-recommendations-script";
pub const SOURCE_CONTROL_LABEL: &str = "source-control-managed";

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VpaData {
    #[serde(default)]
    spec: VpaSpec,
    #[serde(default)]
    status: Option<VpaStatus>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VpaSpec {
    target_ref: Option<TargetRef>,
    update_policy: Option<UpdatePolicy>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetRef {
    #[serde(default)]
    api_version: String,
    kind: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePolicy {
    update_mode: Option<String>,
}

#[derive(Deserialize)]
struct VpaStatus {
    recommendation: Option<Recommendation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Recommendation {
    #[serde(default)]
    container_recommendations: Vec<ContainerRecommendationData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerRecommendationData {
    #[serde(default)]
    container_name: String,
    #[serde(default)]
    uncapped_target: BTreeMap<String, Quantity>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns the `ApiResource` descriptor used to build the dynamic VPA API.
pub fn vpa_api_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind {
        group: VPA_GROUP.to_string(),
        version: VPA_VERSION.to_string(),
        kind: VPA_KIND.to_string(),
    })
}

/// Convention: `<target-name>-vpa-<suffix>`
pub fn vpa_name(target: &VpaTarget) -> String {
    format!("{}-vpa-{}", target.name, VPA_NAME_SUFFIX)
}

/// Label selector matching every VPA this tool created.
pub fn managed_selector() -> String {
    format!("{}={}", MANAGED_BY_LABEL, MANAGED_BY_VALUE)
}

fn managed_labels() -> BTreeMap<String, String> {
    [
        (SOURCE_CONTROL_LABEL.to_string(), "false".to_string()),
        (MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string()),
    ]
    .into_iter()
    .collect()
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// The VPA this tool creates for a target that has none.
pub fn desired_vpa(namespace: &str, target: &VpaTarget) -> VpaRecord {
    VpaRecord {
        name: vpa_name(target),
        namespace: namespace.to_string(),
        target: Some(target.clone()),
        update_mode: Some(UPDATE_MODE_OFF.to_string()),
        labels: managed_labels(),
        recommendations: Vec::new(),
    }
}

/// Encodes a record as a `DynamicObject` ready to be POSTed.
pub fn to_dynamic(record: &VpaRecord) -> DynamicObject {
    let mut spec = json!({});
    if let Some(target) = &record.target {
        spec["targetRef"] = json!({
            "apiVersion": target.api_version,
            "kind":       target.kind,
            "name":       target.name,
        });
    }
    if let Some(mode) = &record.update_mode {
        spec["updatePolicy"] = json!({ "updateMode": mode });
    }

    let mut obj = DynamicObject::new(&record.name, &vpa_api_resource());
    obj.metadata = ObjectMeta {
        name: Some(record.name.clone()),
        namespace: Some(record.namespace.clone()),
        labels: (!record.labels.is_empty()).then(|| record.labels.clone()),
        ..Default::default()
    };
    obj.data = json!({ "spec": spec });
    obj
}

/// Decodes a listed VPA.
///
/// Missing `cpu`/`memory` keys in an uncapped target read as zero.
pub fn from_dynamic(obj: &DynamicObject, namespace: &str) -> Result<VpaRecord> {
    let data: VpaData = if obj.data.is_null() {
        VpaData::default()
    } else {
        serde_json::from_value(obj.data.clone())?
    };

    let mut recommendations = Vec::new();
    let containers = data
        .status
        .and_then(|s| s.recommendation)
        .map(|r| r.container_recommendations)
        .unwrap_or_default();
    for c in containers {
        let cpu = c
            .uncapped_target
            .get("cpu")
            .map(|q| q.0.clone())
            .unwrap_or_else(|| "0".to_string());
        let memory_bytes = match c.uncapped_target.get("memory") {
            Some(q) => quantity::value(&q.0)?,
            None => 0,
        };
        recommendations.push(ContainerRecommendation {
            container_name: c.container_name,
            cpu_milli: quantity::milli_value(&cpu)?,
            cpu,
            memory_bytes,
        });
    }

    Ok(VpaRecord {
        name: obj.metadata.name.clone().unwrap_or_default(),
        namespace: obj
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| namespace.to_string()),
        target: data
            .spec
            .target_ref
            .map(|t| VpaTarget::new(t.api_version, t.kind, t.name)),
        update_mode: data.spec.update_policy.and_then(|p| p.update_mode),
        labels: obj.metadata.labels.clone().unwrap_or_default(),
        recommendations,
    })
}
