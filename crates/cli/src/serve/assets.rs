//! Static asset serving from the configured static directory.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::handlers::not_found;
use super::state::AppState;

/// Content type for a static file, by extension.
pub(crate) fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "text/plain",
    }
}

/// Resolve a request path below `root`. Only plain file-name components are
/// accepted, so the result can never leave `root`.
pub(crate) fn resolve(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let mut resolved = root.to_path_buf();
    let mut any = false;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                any = true;
            }
            _ => return None,
        }
    }
    any.then_some(resolved)
}

/// GET /static/{*name}
pub(crate) async fn handle_static(
    State(state): State<Arc<AppState>>,
    UrlPath(name): UrlPath<String>,
) -> Response {
    let Some(path) = resolve(&state.static_dir, &name) else {
        tracing::debug!(name = %name, "rejected static path");
        return not_found().into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "static file unavailable");
            not_found().into_response()
        }
    }
}
