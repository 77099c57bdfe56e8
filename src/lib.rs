//! taskdash -- read-only dashboard for scheduled task runs.
//!
//! This crate loads the exit log, next-execution map and generation timestamp
//! written by a task pipeline, converts every instant to Alaska time,
//! classifies exit codes, and renders the result as an HTML page.

pub mod api;
pub mod config;
pub mod loaders;
pub mod render;
pub mod source;
pub mod status;
pub mod table;
pub mod time;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::DashConfig;
use crate::loaders::Dashboard;

/// Start the HTTP server for the dashboard.
pub async fn serve(config: &DashConfig) -> Result<()> {
    let location = &config.source.location;
    let source = source::open_source(location);
    let data_dir = (!source::is_remote(location)).then(|| PathBuf::from(location));
    tracing::info!(source = %source.describe(), "Using data source");

    let state = api::state::AppState {
        source,
        display: config.display.clone(),
        data_dir,
    };
    let app = api::router(state);

    let addr: std::net::SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.server.bind))?;
    tracing::info!(%addr, "taskdash listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load the dashboard once and render it to a standalone HTML page.
pub async fn render_once(config: &DashConfig) -> Result<String> {
    let source = source::open_source(&config.source.location);
    let dashboard = Dashboard::load(source.as_ref()).await;
    render::render_static(&dashboard, &config.display)
}
