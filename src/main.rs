use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ktrack::config;
use ktrack::{DeviceRegistry, KismetClient, KismetPoller, ZoneIndex};

#[derive(Parser, Debug)]
#[command(name = "ktrack", version, about = "Presence tracker backed by a Kismet wireless sniffer")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "ktrack.toml")]
    config: PathBuf,

    /// Run a single scan cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = config::load(&args.config)
        .with_context(|| format!("cannot load {}", args.config.display()))?;

    let client = KismetClient::from_config(&config.kismet);
    let zones = ZoneIndex::from_config(&config.zones);
    let mut poller = KismetPoller::new(client, &config.tracker, zones, DeviceRegistry::new());

    if args.once {
        let summary = poller.poll_once().await;
        tracing::info!(
            "Single cycle: {} device(s) seen, {} now tracked",
            summary.devices,
            poller.sink().len()
        );
    } else {
        tracing::info!(
            "Polling {}:{} every {}s",
            config.kismet.server,
            config.kismet.port,
            config.tracker.scan_interval
        );
        poller.run().await;
    }

    Ok(())
}
