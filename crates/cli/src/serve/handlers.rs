//! Page, view and trigger handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uap_jobs::{JobResult, Routine, TriggerError};
use uap_state::format::{format_timestamp, now};
use uap_state::host::HostFacts;
use uap_state::Domain;

use super::state::AppState;
use crate::render::{Page, PageContext};

/// 404 body used for every unmatched route and missing asset.
pub(crate) fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "File not found",
    )
}

/// Fallback handler for unmatched routes and methods.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    not_found()
}

/// Run blocking file work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!(error = %e, "blocking task failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Internal server error",
        )
            .into_response()
    })
}

fn page_context(state: &AppState, page: Page) -> PageContext {
    let at = now();
    let current_time = format_timestamp(at);
    match page {
        Page::Dashboard => {
            let system = state.store.system_view(&HostFacts::collect(), at);
            PageContext::dashboard(&system, &current_time)
        }
        Page::System => {
            let system = state.store.system_view(&HostFacts::collect(), at);
            PageContext::system(&system, &current_time)
        }
        Page::Monitoring => PageContext::monitoring(&state.store.monitoring_view(), &current_time),
        Page::Security => PageContext::security(&state.store.security_view(), &current_time),
        Page::Backups => PageContext::backups(&state.store.backup_view(), &current_time),
    }
}

async fn render_page(state: Arc<AppState>, page: Page) -> Response {
    let html = blocking(move || {
        let context = page_context(&state, page);
        state.pages.render(&context)
    })
    .await;

    match html {
        Ok(html) => Html(html).into_response(),
        Err(response) => response,
    }
}

/// GET / and /index.html
pub(crate) async fn handle_dashboard(State(state): State<Arc<AppState>>) -> Response {
    render_page(state, Page::Dashboard).await
}

/// GET /system
pub(crate) async fn handle_system_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(state, Page::System).await
}

/// GET /monitoring
pub(crate) async fn handle_monitoring_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(state, Page::Monitoring).await
}

/// GET /security
pub(crate) async fn handle_security_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(state, Page::Security).await
}

/// GET /backups
pub(crate) async fn handle_backups_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(state, Page::Backups).await
}

async fn view_json(state: Arc<AppState>, domain: Domain) -> Response {
    match blocking(move || state.store.view(domain)).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(response) => response,
    }
}

/// GET /api/system
pub(crate) async fn handle_api_system(State(state): State<Arc<AppState>>) -> Response {
    view_json(state, Domain::System).await
}

/// GET /api/monitoring
pub(crate) async fn handle_api_monitoring(State(state): State<Arc<AppState>>) -> Response {
    view_json(state, Domain::Monitoring).await
}

/// GET /api/security
pub(crate) async fn handle_api_security(State(state): State<Arc<AppState>>) -> Response {
    view_json(state, Domain::Security).await
}

/// GET /api/backups
pub(crate) async fn handle_api_backups(State(state): State<Arc<AppState>>) -> Response {
    view_json(state, Domain::Backup).await
}

fn job_response(status: StatusCode, result: impl Serialize) -> Response {
    (status, Json(result)).into_response()
}

async fn run_routine(state: Arc<AppState>, routine: Routine) -> Response {
    match state.trigger.trigger(routine).await {
        Ok(result) => job_response(StatusCode::OK, result),
        Err(e @ TriggerError::AlreadyRunning(_)) => {
            job_response(StatusCode::CONFLICT, JobResult::failure(e.to_string()))
        }
        Err(e) => job_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            JobResult::failure(e.to_string()),
        ),
    }
}

/// POST /api/run_monitor
pub(crate) async fn handle_run_monitor(State(state): State<Arc<AppState>>) -> Response {
    run_routine(state, Routine::Monitor).await
}

/// POST /api/run_security_scan
pub(crate) async fn handle_run_security_scan(State(state): State<Arc<AppState>>) -> Response {
    run_routine(state, Routine::SecurityScan).await
}

/// POST /api/run_backup
pub(crate) async fn handle_run_backup(State(state): State<Arc<AppState>>) -> Response {
    run_routine(state, Routine::Backup).await
}
