//!
//! filegate HTTP server
//! --------------------
//! Axum-based JSON API over a single sandboxed directory tree, plus the static web client.
//!
//! Responsibilities:
//! - Validate the root directory and its ownership before serving.
//! - Mount the list/ls/upload/delete/rename/mkdir/move endpoints.
//! - Map `AppError` to HTTP status codes and a uniform JSON error body.
//! - Serve the web client from the static directory.
//!
//! Handlers share nothing but the immutable `AppState`; concurrent mutations of the same
//! path race at the filesystem level and are not coordinated here.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, info_span, Level};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::sandbox::Root;

pub mod api;
pub mod upload;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: Root,
    /// Directory where upload bodies are spooled before being moved into place.
    pub staging_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(root: Root, staging_dir: PathBuf) -> Self {
        Self { root, staging_dir: Arc::new(staging_dir) }
    }
}

/// Uniform `{success, message}` body for successful mutations.
#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn ok<S: Into<String>>(message: S) -> Json<Self> {
        Json(Self { success: true, message: message.into() })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({
            "success": false,
            "error": self.message(),
            "code": self.code_str(),
        });
        (status, Json(body)).into_response()
    }
}

/// Run blocking filesystem work off the async workers. A panic inside `f` becomes a 500.
pub(crate) async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(join_err) => {
            error!("filesystem task failed: {}", join_err);
            Err(AppError::internal("internal_error", "internal error while accessing the filesystem"))
        }
    }
}

/// Build the router: API routes, static web client, body limit and request tracing.
pub fn build_app(state: AppState, static_dir: &Path, body_limit: usize) -> Router {
    let api = Router::new()
        .route("/api/list", get(api::list_handler))
        .route("/api/ls", get(api::ls_handler))
        .route("/api/upload", post(upload::upload_handler).layer(DefaultBodyLimit::max(body_limit)))
        .route("/api/delete", delete(api::delete_handler))
        .route("/api/rename", post(api::rename_handler))
        .route("/api/mkdir", post(api::mkdir_handler))
        .route("/api/move", post(api::move_handler))
        .with_state(state);

    api.nest_service("/static", ServeDir::new(static_dir))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    info_span!(
                        "request",
                        request_id = %Uuid::new_v4(),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Validate the root, then bind and serve until Ctrl-C / SIGTERM.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let root = Root::new(&config.root_dir)
        .with_context(|| format!("Invalid root directory: {}", config.root_dir.display()))?;
    log_startup(&config, &root)?;

    let staging_dir = config.staging_dir();
    std::fs::create_dir_all(&staging_dir)
        .with_context(|| format!("Failed to create or access upload staging dir: {}", staging_dir.display()))?;

    let state = AppState::new(root, staging_dir);
    let app = build_app(state, &config.static_dir, config.body_limit());

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server starting on {}", addr);
    serve(listener, app).await
}

fn log_startup(config: &ServerConfig, root: &Root) -> anyhow::Result<()> {
    crate::startup::log_startup_folders(config, root);
    if config.skip_owner_check {
        tracing::warn!(target: "startup", "root ownership check disabled");
    } else {
        crate::startup::verify_root_owner(root.path())?;
    }
    info!("Starting file manager server with root directory: {}", root.path().display());
    Ok(())
}

/// Serve `app` on an already-bound listener with graceful shutdown.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
