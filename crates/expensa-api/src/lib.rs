//! HTTP upload endpoint for PhonePe statements.
//!
//! `POST /api/phonepe/upload/` takes a multipart form with a `pdf_file`
//! field and an `Authorization: Bearer <token>` header, runs the ingestion
//! pipeline for the token's user and answers with a summary of what was
//! saved. `GET /health/liveness` answers `ok`.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes;

    let api = routes::upload::router()
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state);

    Router::new()
        .route("/health/liveness", get(liveness))
        .merge(api)
        .layer(TraceLayer::new_for_http())
}

/// GET /health/liveness
async fn liveness() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await
}
