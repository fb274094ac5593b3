//! Dashboard: Axum web server for the demo page.
//!
//! Serves a REST API and a self-contained HTML page that polls it.
//! CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use routes::AppState;

/// The embedded page (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Bind the port and serve the dashboard on a background task.
///
/// Binding happens before returning, so a busy port is reported to the
/// caller instead of killing the task.
pub async fn spawn_dashboard(state: AppState, port: u16) -> Result<JoinHandle<()>> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;

    info!(port, "Dashboard server starting on http://localhost:{port}");

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    }))
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route("/api/frame", get(routes::get_frame))
        .route("/api/price", get(routes::get_price))
        .route("/api/log", get(routes::get_log))
        .route("/api/wagers", get(routes::get_wagers).post(routes::place_wager))
        .route("/api/ticker/start", post(routes::start_ticker))
        .route("/api/ticker/stop", post(routes::stop_ticker))
        .route("/api/carousel", get(routes::get_carousel))
        .route("/api/carousel/select", post(routes::select_slide))
        .route("/api/settings", get(routes::get_settings))
        .route("/health", get(routes::health))
        // Page
        .route("/", get(serve_dashboard))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML page.
async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
