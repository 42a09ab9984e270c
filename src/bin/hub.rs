use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use wallboard::{
    actors::{messages::CycleEvent, poller::PollerHandle},
    audio::{AudioHandle, NullBackend},
    config::{Config, read_config_file},
    fetch::MetricsFetcher,
    storage::{FileStore, KeyValueStore, MemoryStore},
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("wallboard", LevelFilter::TRACE),
        ("hub", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    run_board(config).await;

    Ok(())
}

async fn run_board(config: Config) {
    let store: Arc<dyn KeyValueStore> = match &config.storage_dir {
        Some(dir) => {
            debug!("persisting state under {}", dir.display());
            Arc::new(FileStore::new(dir))
        }
        None => {
            debug!("no storage directory configured, state is in-memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let fetcher = match &config.token {
        Some(token) => MetricsFetcher::new(config.source_url.as_str()).with_secret(token.as_str()),
        None => MetricsFetcher::new(config.source_url.as_str()),
    };

    let audio = AudioHandle::spawn(Box::new(NullBackend), store.clone());

    let (cycle_tx, mut cycle_rx) = broadcast::channel(16);
    let poller = PollerHandle::spawn(
        fetcher,
        store,
        config.metrics.clone(),
        config.interval,
        audio.clone(),
        cycle_tx,
    );

    info!(
        "wallboard hub polling {} every {}s ({} metrics)",
        config.source_url,
        config.interval,
        config.metrics.len()
    );

    loop {
        tokio::select! {
            result = cycle_rx.recv() => {
                match result {
                    Ok(event) => log_cycle(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("log subscriber lagged, skipped {skipped} cycles");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("cycle channel closed");
                        break;
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    poller.shutdown().await;
    audio.shutdown().await;
}

fn log_cycle(event: &CycleEvent) {
    let fired: Vec<&str> = event
        .changes
        .iter()
        .filter(|c| c.fired.is_some())
        .map(|c| c.id.as_str())
        .collect();

    info!(
        "cycle for tenant {} at {}: {} metrics, {} alert(s){}{}",
        event.tenant,
        event.timestamp,
        event.changes.len(),
        fired.len(),
        if fired.is_empty() { "" } else { ": " },
        fired.join(", ")
    );

    for change in &event.changes {
        trace!(
            "{}: {}{} (Δ {:?}, {:?}%)",
            change.id,
            change.record.current,
            change.unit,
            change.record.delta,
            change.record.percent
        );
    }
}
