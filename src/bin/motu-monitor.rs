//! Streams datastore changes from a MOTU AVB device to stdout.
//!
//! Connects to the device, mirrors its datastore and prints one line per
//! change as `path = value`. The initial snapshot is absorbed silently.
//! Stops on Ctrl-C.

use clap::Parser;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use motu_avb::{Config, Device};

#[derive(Parser)]
#[command(name = "motu-monitor")]
#[command(version)]
#[command(about = "Watch a MOTU AVB device datastore for changes", long_about = None)]
struct Cli {
    /// Device address (host:port), overrides the config file
    #[arg(long, short)]
    addr: Option<String>,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("motu_avb=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config)?;
    if let Some(addr) = cli.addr {
        config.addr = addr;
    }

    tracing::info!("Watching datastore on {}", config.addr);

    let device = Device::new(config.clone())?;
    let store = device.store();
    let watcher = device.watcher()?;

    let (events_tx, mut events_rx) = mpsc::channel(config.event_buffer.max(1));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = tokio::spawn(watcher.run(events_tx, shutdown_rx));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                let _ = shutdown_tx.send(true);
                break;
            }
            event = events_rx.recv() => match event {
                Some(event) => println!("{} = {}", event.path, event.value),
                None => break,
            }
        }
    }

    let _ = worker.await;
    tracing::info!("Mirrored {} path(s)", store.len());

    Ok(())
}
