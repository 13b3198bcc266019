//! Namespace selection shared by both jobs.

use tracing::info;

use crate::cluster::ClusterClient;
use crate::error::Result;

/// Resolves the namespaces a run operates on.
///
/// An explicit comma-separated list is returned verbatim (split only, no
/// trimming, de-duplication or validation). Otherwise every namespace in the
/// cluster is returned in listing order. A failed listing aborts the run.
pub async fn select_namespaces(
    client: &dyn ClusterClient,
    explicit: Option<&str>,
) -> Result<Vec<String>> {
    match explicit.filter(|list| !list.is_empty()) {
        Some(list) => {
            info!("Targeting specific namespaces: {}", list);
            Ok(list.split(',').map(str::to_string).collect())
        }
        None => client.list_namespaces().await,
    }
}
