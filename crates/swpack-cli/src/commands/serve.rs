//! `swpack serve`: development passthrough server.
//!
//! ```text
//! GET /<destination>  → worker entry via sw-plugin:dev (placeholder = dev)
//! GET /@sw-plugin     → virtual:sw-plugin registration module
//! GET /<path>         → file under the project root
//! ```

use super::ProjectArgs;
use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use swpack_core::plugin::PluginContainer;
use swpack_core::{Command, REGISTRATION_ID};
use tracing::{info, warn};

/// URL the registration module is served under.
pub const REGISTRATION_URL: &str = "/@sw-plugin";

const JAVASCRIPT: &str = "application/javascript; charset=utf-8";

struct ServeState {
    root: PathBuf,
    plugins: PluginContainer,
}

type AppState = Arc<ServeState>;

/// Run the dev server until interrupted.
pub async fn run(args: &ProjectArgs, host: &str, port: u16) -> Result<()> {
    let project = args.load()?;
    let plugins = project.plugins(Command::Serve).await?;
    let state = Arc::new(ServeState {
        root: project.root.clone(),
        plugins,
    });

    let app = router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse().into_diagnostic()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;

    info!(%addr, "dev server listening");
    println!();
    println!("  Workers served at http://{addr}");
    println!("  Registration module at http://{addr}{REGISTRATION_URL}");
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .into_diagnostic()?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(REGISTRATION_URL, get(serve_registration))
        .route("/*path", get(serve_path))
        .with_state(state)
}

async fn serve_registration(State(state): State<AppState>) -> Response {
    load_module(&state, REGISTRATION_ID).await
}

async fn serve_path(State(state): State<AppState>, AxumPath(path): AxumPath<String>) -> Response {
    let url_path = format!("/{path}");

    match state.plugins.resolve_id(&url_path, None) {
        Ok(Some(resolved)) => return load_module(&state, &resolved.id).await,
        Ok(None) => {}
        Err(e) => return error_response(&e.to_string()),
    }

    let Some(file) = safe_join(&state.root, &path) else {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };
    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, format!("Not found: {url_path}")).into_response(),
    }
}

async fn load_module(state: &ServeState, id: &str) -> Response {
    match state.plugins.load(id).await {
        Ok(Some(module)) => ([(header::CONTENT_TYPE, JAVASCRIPT)], module.code).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, format!("Not found: {id}")).into_response(),
        Err(e) => error_response(&e.to_string()),
    }
}

fn error_response(message: &str) -> Response {
    warn!(error = message, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
}

/// Join a URL path onto the root, refusing anything that escapes it.
fn safe_join(root: &Path, url_path: &str) -> Option<PathBuf> {
    let rel = Path::new(url_path.trim_start_matches('/'));
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(rel))
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js" | "mjs" | "ts") => JAVASCRIPT,
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json" | "webmanifest") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_join() {
        let root = Path::new("/project");
        assert_eq!(
            safe_join(root, "assets/app.js"),
            Some(PathBuf::from("/project/assets/app.js"))
        );
        assert_eq!(safe_join(root, "../etc/passwd"), None);
        assert_eq!(safe_join(root, "a/./b"), Some(PathBuf::from("/project/a/b")));
        assert_eq!(safe_join(root, "a/../../b"), None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("sw.js")), JAVASCRIPT);
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }
}
