//! Route definitions.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::state::AppState;
use crate::loaders::Dashboard;
use crate::render::render_dashboard;
use crate::table::{TableParams, TableQuery};

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard))
}

/// Loads every region once per request and renders the page.
async fn index(
    State(state): State<AppState>,
    Query(params): Query<TableParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let dashboard = Dashboard::load(state.source.as_ref()).await;
    let query = TableQuery::from_params(params, state.display.page_size);
    render_dashboard(&dashboard, &query, &state.display)
        .map(Html)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to render dashboard");
            (StatusCode::INTERNAL_SERVER_ERROR, "render failed".to_string())
        })
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn dashboard(State(state): State<AppState>) -> Json<Value> {
    let dashboard = Dashboard::load(state.source.as_ref()).await;
    let failed = dashboard.failed_regions();
    Json(json!({
        "data": dashboard,
        "meta": {
            "source": state.source.describe(),
            "failed_regions": failed
        }
    }))
}
