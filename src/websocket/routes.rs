use crate::hub::NotificationHub;
use axum::extract::State;
use axum::routing::get;
use std::sync::Arc;

use super::handler::websocket_handler;
use super::metrics::metrics_handler;

/// Create the Axum router with WebSocket support.
///
/// Only `/api/ws` is upgraded; any other path is left to the surrounding
/// routes and the fallback.
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<NotificationHub>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/api/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .fallback(|| async { "Pulse Hub. Use /api/ws for the WebSocket protocol, /metrics for metrics." })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check(
    State(hub): State<Arc<NotificationHub>>,
) -> axum::response::Result<&'static str> {
    if hub.health_check().await {
        Ok("OK")
    } else {
        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE.into())
    }
}
