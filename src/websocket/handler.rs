use crate::hub::NotificationHub;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, Query, State};
use axum::response::Response;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use super::connection::handle_socket;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// WebSocket handler for the notification protocol.
///
/// The authentication verdict is computed before the upgrade completes so
/// exactly one atomic decision exists per transport; the rejection itself
/// (error frame + policy close) happens on the upgraded socket, which is the
/// only place a frame can still be delivered to the client.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<WsQuery>,
    State(hub): State<Arc<NotificationHub>>,
) -> Response {
    let auth = hub.auth_gate().authenticate(query.token.as_deref());

    ws.on_upgrade(move |socket| handle_socket(socket, hub, addr, auth))
}
