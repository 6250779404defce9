//! `uap serve` -- HTTP status server for the admin platform.
//!
//! Renders the state artifacts written by the maintenance jobs as HTML pages
//! and JSON views, and lets an operator trigger the jobs on demand.
//!
//! Endpoints:
//! - GET  /, /index.html                  - Dashboard page
//! - GET  /system, /monitoring            - Pages
//! - GET  /security, /backups             - Pages
//! - GET  /static/{*name}                 - Static assets
//! - GET  /api/system, /api/monitoring    - JSON views
//! - GET  /api/security, /api/backups     - JSON views
//! - POST /api/run_monitor                - Run the monitor routine
//! - POST /api/run_security_scan          - Run the security scan routine
//! - POST /api/run_backup                 - Run the backup routine
//!
//! Anything else is a plain-text 404.

mod assets;
mod handlers;
mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::assets::handle_static;
use self::handlers::{
    handle_api_backups, handle_api_monitoring, handle_api_security, handle_api_system,
    handle_backups_page, handle_dashboard, handle_monitoring_page, handle_not_found,
    handle_run_backup, handle_run_monitor, handle_run_security_scan, handle_security_page,
    handle_system_page,
};
pub(crate) use self::state::AppState;
use crate::config::Config;

/// Maximum request body size. Trigger bodies are ignored.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Build the route table over `state`.
pub(crate) fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_dashboard))
        .route("/index.html", get(handle_dashboard))
        .route("/system", get(handle_system_page))
        .route("/monitoring", get(handle_monitoring_page))
        .route("/security", get(handle_security_page))
        .route("/backups", get(handle_backups_page))
        .route("/static/{*name}", get(handle_static))
        .route("/api/system", get(handle_api_system))
        .route("/api/monitoring", get(handle_api_monitoring))
        .route("/api/security", get(handle_api_security))
        .route("/api/backups", get(handle_api_backups))
        .route("/api/run_monitor", post(handle_run_monitor))
        .route("/api/run_security_scan", post(handle_run_security_scan))
        .route("/api/run_backup", post(handle_run_backup))
        .method_not_allowed_fallback(handle_not_found)
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl+C.
pub(crate) async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config));
    tracing::info!(
        data_dir = %config.state.data_dir.display(),
        template_dir = %config.template_dir.display(),
        static_dir = %config.static_dir.display(),
        "serving platform state"
    );

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("uap listening on http://0.0.0.0:{}", config.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("received shutdown signal");
}
