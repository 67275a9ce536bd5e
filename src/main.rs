use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meetup_snapshot::{pipeline, SnapshotConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SnapshotConfig::load().context("failed to load configuration")?;
    let summary = pipeline::run(&config)
        .await
        .context("snapshot run failed; prior snapshot left untouched")?;

    info!(
        upcoming = summary.upcoming,
        past = summary.past,
        path = %summary.snapshot_path.display(),
        "done"
    );
    Ok(())
}
