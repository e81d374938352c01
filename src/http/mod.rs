//! HTTP surface.
//!
//! - `handlers`: route handlers and request/response bodies
//! - `upload`: file name sanitization and upload storage
//! - `errors`: `ApiError` → status code + `{"detail": ...}`
//!
//! Every session route takes the session's own lock for the whole request,
//! so requests against one session are serialized and different sessions
//! never contend.

pub mod errors;
pub mod handlers;
pub mod upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::session::SessionManager;

pub use errors::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(sessions: SessionManager, config: ServiceConfig) -> Self {
        Self {
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let agent = Router::new()
        .route("/test-connection", get(handlers::test_connection))
        .route("/upload", post(handlers::upload_file))
        .route("/sessions/:id", axum::routing::delete(handlers::delete_session))
        .route("/sessions/:id/sheet", post(handlers::select_sheet))
        .route("/sessions/:id/analyze", post(handlers::analyze))
        .route("/sessions/:id/info", get(handlers::sheet_info));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/api/v1/agent", agent)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if values.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(values)
    }
}
