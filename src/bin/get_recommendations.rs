//! Queries the VPAs in every namespace (or the selected subset) and writes
//! the uncapped CPU and memory recommendations, next to the current
//! requests, to `results.csv`. Units follow Kubernetes resource notation so
//! values can be copied straight into manifests.

use clap::Parser;
use tracing::info;
use vpa_rightsizer::{
    cli::JobArgs,
    cluster::KubeCluster,
    config::{build_client, ClientSettings},
    namespaces::select_namespaces,
    report::{self, RESULTS_FILE},
    telemetry, Error,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = JobArgs::parse();
    telemetry::init_logging()?;

    let client = build_client(&ClientSettings::from_env()?).await?;
    let cluster = KubeCluster::new(client);

    let namespaces = select_namespaces(&cluster, args.namespaces()).await?;
    let rows = report::run(&cluster, &namespaces).await?;

    report::write_report(RESULTS_FILE, &rows)?;
    info!("Wrote {} rows to {}", rows.len(), RESULTS_FILE);
    Ok(())
}
