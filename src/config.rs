//! Kubernetes client configuration.
//!
//! Connection details come from `kube::Config::infer` (KUBECONFIG, the
//! default kubeconfig, or the in-cluster service account). Timeouts keep the
//! client's defaults unless overridden through the environment.

use std::time::Duration;

use kube::{Client, Config};
use tracing::debug;

use crate::error::{Error, Result};

pub const CONNECT_TIMEOUT_ENV: &str = "KUBE_CONNECT_TIMEOUT_SECS";
pub const READ_TIMEOUT_ENV: &str = "KUBE_READ_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            connect_timeout: parse_timeout(CONNECT_TIMEOUT_ENV, lookup(CONNECT_TIMEOUT_ENV))?,
            read_timeout: parse_timeout(READ_TIMEOUT_ENV, lookup(READ_TIMEOUT_ENV))?,
        })
    }

    fn apply(&self, config: &mut Config) {
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout = Some(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            config.read_timeout = Some(timeout);
        }
    }
}

fn parse_timeout(key: &str, raw: Option<String>) -> Result<Option<Duration>> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(Error::ConfigError(format!(
            "{} must be a positive number of seconds, got {:?}",
            key, raw
        ))),
    }
}

/// Builds a client from the inferred kubeconfig and `settings`.
pub async fn build_client(settings: &ClientSettings) -> Result<Client> {
    let mut config = Config::infer()
        .await
        .map_err(|e| Error::ConfigError(format!("failed to load kubeconfig: {}", e)))?;
    settings.apply(&mut config);
    debug!("Using cluster {}", config.cluster_url);

    Client::try_from(config)
        .map_err(|e| Error::ConfigError(format!("failed to build Kubernetes client: {}", e)))
}
