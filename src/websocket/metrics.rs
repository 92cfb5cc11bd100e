use crate::hub::NotificationHub;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use std::sync::Arc;

fn enforce_metrics_auth(headers: &HeaderMap, hub: &NotificationHub) -> Result<(), StatusCode> {
    let Some(raw_header) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Unauthorized metrics access attempt: missing Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Some(token) = raw_header.strip_prefix("Bearer ") else {
        tracing::warn!("Unauthorized metrics access attempt: invalid Authorization scheme");
        return Err(StatusCode::UNAUTHORIZED);
    };

    if let Some(expected) = hub.config().metrics_auth_token.as_deref() {
        if token == expected {
            return Ok(());
        }
    }

    tracing::warn!("Unauthorized metrics access attempt: token rejected");
    Err(StatusCode::UNAUTHORIZED)
}

/// Metrics API endpoint - returns live counters from the hub.
pub async fn metrics_handler(
    headers: HeaderMap,
    State(hub): State<Arc<NotificationHub>>,
) -> axum::response::Result<axum::response::Json<serde_json::Value>> {
    if hub.config().require_metrics_auth {
        enforce_metrics_auth(&headers, hub.as_ref())?;
    }

    let snapshot = hub.metrics().snapshot();

    Ok(axum::response::Json(serde_json::json!({
        "timestamp": snapshot.timestamp.to_rfc3339(),
        "activeConnections": hub.connection_count(),
        "connectedUsers": hub.user_count(),
        "counters": snapshot,
    })))
}
