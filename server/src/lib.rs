use std::io;
use std::net::SocketAddr;
use std::path::Path;

use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod handlers;
pub mod registry;
pub mod relay;
pub mod state;

use crate::handlers::{internal_error, ping_handler, ws_handler};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),
    #[error("failed to load TLS certificate/key: {0}")]
    Tls(io::Error),
    #[error("server crashed: {0}")]
    Io(#[from] io::Error),
}

pub fn router(state: AppState, public_dir: &Path, cors: CorsLayer) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(internal_error))
        .with_state(state)
}
