// Cascade Client Example: List sites, then read them all in one round
// Demonstrates:
// - Composite helpers: list_sites + read_all
// - Manual rounds: enqueue, submit, flush
// - Inspecting an aggregated round failure

use anyhow::Result;
use cascade_client::{CascadeDriver, ClientConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let mut driver = CascadeDriver::from_config(&config);

    // One round for the site list, one round for every site
    let sites = driver.list_sites().await?;
    info!("Found {} sites", sites.len());

    let assets = driver.read_all(&sites).await?;
    for asset in &assets {
        info!(
            "{} {}",
            asset.asset_type.as_deref().unwrap_or("?"),
            asset.id().unwrap_or("?")
        );
    }

    // Manual round: the caller owns the lifecycle
    for site in sites.iter().take(3) {
        driver.queue_read(site);
    }
    if driver.queue().is_dirty() {
        match driver.submit().await {
            Ok(results) => info!("Manual round returned {} assets", results.len()),
            Err(e) => match e.round() {
                Some(round) => {
                    for failure in round.failures() {
                        warn!("Operation {} failed: {}", failure.index(), failure);
                    }
                }
                None => warn!("Round not dispatched: {}", e),
            },
        }
        driver.flush();
    }

    Ok(())
}
