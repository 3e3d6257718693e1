//! # amt-api: Binary Entry Point
//!
//! Starts the Axum HTTP server and the periodic exam auto-progress task.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use amt_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(?config, "starting assessment workflow API");

    let state = AppState::with_config(config.clone());

    if let Some((name, email)) = &config.bootstrap_exams_officer {
        let officer = state
            .service
            .bootstrap_exams_officer(name, email)
            .context("bootstrapping exams officer")?;
        tracing::info!(user = %officer.id, "exams officer available");
    }
    if let Err(e) = state.service.ensure_exams_officer_invariant() {
        tracing::warn!("{e}; set BOOTSTRAP_EXAMS_OFFICER_NAME and BOOTSTRAP_EXAMS_OFFICER_EMAIL");
    }

    if let Some(period) = config.auto_progress_interval {
        let service = state.service.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                service.auto_progress_due_exams();
            }
        });
        tracing::info!(period_secs = period.as_secs(), "exam auto-progress scheduled");
    } else {
        tracing::info!("exam auto-progress disabled");
    }

    let app = amt_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("assessment workflow API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
