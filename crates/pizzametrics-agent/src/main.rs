//! pizzametrics agent
//!
//! Usage: `pizzametrics-agent [config-path]` (default `pizzametrics.yaml`).
//! Serves the operational routes on `agent.listen` and pushes the aggregated
//! measurements to `metrics.url` every `metrics.period_ms` until Ctrl-C.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use pizzametrics_agent::{app_state::AgentState, config, router};
use pizzametrics_core::error::{MetricsError, Result};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "pizzametrics.yaml".to_string());

    match run(&path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind().as_str(), config = %path, "pizzametrics-agent failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(path: &str) -> Result<()> {
    let cfg = config::load_from_file(path)?;
    let listen = cfg.agent.listen;

    let state = AgentState::new(cfg);
    let reporter = state.start_reporter()?;
    let app = router::build_router(state);

    tracing::info!(%listen, "pizzametrics-agent starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricsError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MetricsError::Internal(format!("server failed: {e}")))?;

    reporter.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
