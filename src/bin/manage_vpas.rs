//! Deploys a recommendation-only VPA for every Deployment, StatefulSet and
//! DaemonSet across the selected namespaces. Workloads that already have a
//! VPA targeting them are skipped.

use clap::Parser;
use tracing::info;
use vpa_rightsizer::{
    cli::JobArgs,
    cluster::{vpa::managed_selector, KubeCluster},
    config::{build_client, ClientSettings},
    namespaces::select_namespaces,
    provision, telemetry, Error,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = JobArgs::parse();
    telemetry::init_logging()?;

    let client = build_client(&ClientSettings::from_env()?).await?;
    let cluster = KubeCluster::new(client);

    let namespaces = select_namespaces(&cluster, args.namespaces()).await?;
    let summary = provision::run(&cluster, &namespaces).await?;

    if !summary.created.is_empty() {
        info!(
            "Created VPAs can be removed with: kubectl delete vpa -A -l {}",
            managed_selector()
        );
    }
    Ok(())
}
