//! Process bootstrap for the telemetry proxy.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use comm_proxy::config::loader::load_config;
use comm_proxy::config::ProxyConfig;
use comm_proxy::dedup::{AdmissionFilter, CounterStore};
use comm_proxy::http::HttpServer;
use comm_proxy::lifecycle::{signals, Shutdown};
use comm_proxy::observability::{logging, metrics};
use comm_proxy::stats::StatsReporter;
use comm_proxy::upstream::Forwarder;
use comm_proxy::version::{report_update_status, UpdateChecker};

#[derive(Parser, Debug)]
#[command(name = "comm-proxy", version)]
#[command(about = "Deduplicating proxy for game telemetry traffic")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        comm_path = %config.upstream.comm_path,
        discard_types = ?config.dedup.discard_types,
        window_secs = config.dedup.window_secs,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    // One explicit service instance holds the shared maps; everything else
    // receives a handle.
    let counters = Arc::new(CounterStore::new());
    let filter = Arc::new(AdmissionFilter::new(&config.dedup, counters.clone()));
    let forwarder = Arc::new(Forwarder::new(&config.upstream, &config.timeouts)?);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    if config.version_check.enabled {
        let owner = config.version_check.owner.clone();
        let repo = config.version_check.repo.clone();
        tokio::spawn(async move {
            report_update_status(&UpdateChecker::new(), &owner, &repo).await;
        });
    }

    if config.stats.enabled {
        let reporter = StatsReporter::new(
            counters.clone(),
            Duration::from_secs(config.stats.interval_secs),
        );
        let stats_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            reporter.run(stats_shutdown).await;
        });
    }

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, filter, forwarder);
    server.run(listener, server_shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
