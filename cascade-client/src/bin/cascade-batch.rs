//! Cascade batch read tool
//!
//! Reads `type:id` pairs from the command line, fetches every asset in one
//! concurrent round and prints each parsed asset as a JSON line, in argument
//! order. With `--sites` it lists the sites visible to the API key instead.
//!
//! Configuration comes from `CASCADE_URL` and `CASCADE_API_KEY`; set
//! `CASCADE_LOG_DIR` to also write a daily log file.

use anyhow::{bail, Context, Result};
use cascade_client::{logging, CascadeDriver, CascadeIdentifier, ClientConfig};
use tracing::{error, info};

fn parse_identifier(arg: &str) -> Result<CascadeIdentifier> {
    match arg.split_once(':') {
        Some((kind, id)) if !kind.is_empty() && !id.is_empty() => {
            Ok(CascadeIdentifier::new(kind, id))
        }
        _ => bail!("expected <type>:<id>, got '{}'", arg),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env().context("Failed to load configuration")?;

    let _guard = match std::env::var("CASCADE_LOG_DIR") {
        Ok(dir) => Some(logging::init_logging(dir, "cascade-batch", config.verbose)?),
        Err(_) => {
            logging::init_console_logging(config.verbose)?;
            None
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let driver = CascadeDriver::from_config(&config);

    if args.iter().any(|a| a == "--sites") {
        let sites = driver.list_sites().await?;
        info!("Found {} sites", sites.len());
        for site in sites {
            println!("{}", serde_json::to_string(&site)?);
        }
        return Ok(());
    }

    if args.is_empty() {
        bail!("usage: cascade-batch <type>:<id>... | --sites");
    }

    let identifiers = args
        .iter()
        .map(|a| parse_identifier(a))
        .collect::<Result<Vec<_>>>()?;

    match driver.read_all(&identifiers).await {
        Ok(assets) => {
            for asset in assets {
                println!("{}", serde_json::to_string(&asset)?);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(round) = e.round() {
                for failure in round.failures() {
                    error!(
                        "{} -> {}",
                        identifiers[failure.index()],
                        failure
                    );
                }
            }
            Err(e.into())
        }
    }
}
