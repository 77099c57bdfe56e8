//! HTTP layer -- axum routes serving the dashboard page and its data.

mod routes;
pub mod state;

use self::state::AppState;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .merge(routes::page_routes())
        .nest("/api/v1", routes::api_routes());

    if let Some(dir) = &state.data_dir {
        app = app.nest_service("/data", ServeDir::new(dir.join("data")));
    }

    app.fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback() -> (axum::http::StatusCode, &'static str) {
    (axum::http::StatusCode::NOT_FOUND, "not found")
}
