//! VPA rightsizing: provision recommendation-only Vertical Pod Autoscalers
//! for every workload controller in a cluster, and later harvest their
//! uncapped recommendations into a drift report.
//!
//! Two one-shot jobs share this crate:
//! - `manage-vpas` ([`provision::run`]) creates a VPA in `Off` mode for each
//!   Deployment, StatefulSet and DaemonSet (or the controller owning it)
//!   that does not already have one.
//! - `get-recommendations` ([`report::run`]) reads those VPAs and writes
//!   recommended vs. current requests to `results.csv`.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod namespaces;
pub mod provision;
pub mod quantity;
pub mod report;
pub mod telemetry;

pub use crate::error::{Error, Result};
