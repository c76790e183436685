//! repsys relay
//!
//! - Scan existing messages once and reclassify the safety ones
//! - Poll for new messages, reclassify, queue, display
//! - Optional ops endpoints (/healthz, /readyz, /metrics)
//! - Clean shutdown on ctrl-c
//!
//! The binary runs against the in-process store; the optional generator feeds
//! it test messages.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use repsys_core::error::{RepSysError, Result};
use repsys_core::memory::InMemoryStore;
use repsys_relay::obs::RelayMetrics;
use repsys_relay::ops::OpsState;
use repsys_relay::simulate::MessageGenerator;
use repsys_relay::{config, router, MessageProcessor, TracingSink};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "repsys-relay failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "repsys.yaml".to_string());
    let cfg = config::load_from_file(&path)?;

    let store = Arc::new(InMemoryStore::new());
    let metrics = Arc::new(RelayMetrics::default());

    let mut processor = MessageProcessor::new(
        Arc::clone(&store),
        cfg.processor.settings(),
        Arc::new(TracingSink),
    )
    .with_metrics(Arc::clone(&metrics));

    let generator = if cfg.simulator.enabled {
        let source = MessageGenerator::new(Arc::clone(&store), cfg.simulator.settings());
        Some(source.spawn(processor.stop_signal())?)
    } else {
        None
    };

    if cfg.processor.scan_on_start {
        processor.scan_existing();
    }
    processor.start()?;

    if let Some(listen) = &cfg.ops.listen {
        let listen: SocketAddr = listen
            .parse()
            .map_err(|e| RepSysError::Config(format!("ops.listen must be a valid SocketAddr: {e}")))?;
        let listener = tokio::net::TcpListener::bind(listen)
            .await
            .map_err(|e| RepSysError::Internal(format!("bind {listen} failed: {e}")))?;
        let app = router::build_router(OpsState::new(Arc::clone(&metrics)));

        tracing::info!(%listen, "ops endpoints listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "ops server failed");
            }
        });
    }

    tracing::info!(config = %path, "repsys-relay running");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable, shutting down");
    }

    tracing::info!("shutting down");
    tokio::task::spawn_blocking(move || {
        processor.shutdown();
        if let Some(g) = generator {
            if g.join().is_err() {
                tracing::error!(thread = "repsys-generator", "worker thread panicked");
            }
        }
    })
    .await
    .map_err(|e| RepSysError::Internal(format!("shutdown task failed: {e}")))?;

    Ok(())
}
