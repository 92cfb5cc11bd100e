use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::auth::{AuthError, AuthenticatedUser};
use crate::hub::{NotificationHub, OutboundFrame};
use crate::protocol::{ConnectionId, ErrorCode, EventMessage, UserId};

use super::sending::{send_event_frame, send_immediate_event};

/// Drive one upgraded socket for its whole lifetime.
///
/// Rejected upgrades get one error frame and a policy-violation close on the
/// still-open transport. Admitted connections are split into a write task
/// (draining the registry-owned send queue) and a read task (frames, acks,
/// close); whichever finishes first aborts the other, and the registry entry
/// is released exactly once on the way out.
pub(super) async fn handle_socket(
    mut socket: WebSocket,
    hub: Arc<NotificationHub>,
    addr: SocketAddr,
    auth: Result<AuthenticatedUser, AuthError>,
) {
    let user = match auth {
        Ok(user) => user,
        Err(err) => {
            hub.metrics().increment_auth_failures();
            tracing::warn!(client_addr = %addr, error = %err, "Rejecting unauthenticated WebSocket upgrade");
            reject_socket(&mut socket, &err).await;
            return;
        }
    };

    let (tx, rx) = mpsc::channel::<OutboundFrame>(hub.config().send_queue_capacity);
    let connection_id = hub.register_connection(user.user_id.clone(), tx);
    tracing::info!(
        %connection_id,
        user_id = %user.user_id,
        client_addr = %addr,
        "WebSocket connection established"
    );

    // Initial-state push, so the client learns its connection identity.
    hub.deliver_to_connection(&connection_id, EventMessage::connected(connection_id));

    let (sender, receiver) = socket.split();

    let mut send_task = tokio::spawn(write_loop(sender, rx, connection_id));

    let read_hub = hub.clone();
    let user_id = user.user_id.clone();
    let mut recv_task = tokio::spawn(read_loop(receiver, read_hub, connection_id, user_id));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unregister_connection(&connection_id);
    tracing::info!(%connection_id, "WebSocket connection closed");
}

/// Emit one error event on the still-open transport, then close it with a
/// policy-violation status.
async fn reject_socket(socket: &mut WebSocket, err: &AuthError) {
    let event = EventMessage::error(ErrorCode::AuthenticationFailed, err.to_string());
    if let Err(send_err) = send_immediate_event(socket, &event).await {
        tracing::debug!(error = %send_err, "Failed to send authentication error frame");
    }

    let close = CloseFrame {
        code: close_code::POLICY,
        reason: "authentication failed".into(),
    };
    let _ = socket.send(Message::Close(Some(close))).await;
}

/// Drain the connection's send queue onto the socket.
///
/// Ends when the queue closes (eviction, shutdown, or normal teardown; in
/// each case the registry entry is already gone) or the transport errors.
async fn write_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<OutboundFrame>,
    connection_id: ConnectionId,
) {
    while let Some(frame) = rx.recv().await {
        let result = match frame {
            OutboundFrame::Event(event) => send_event_frame(&mut sender, event.as_ref()).await,
            OutboundFrame::Ping => sender.send(Message::Ping(Bytes::new())).await,
        };

        if result.is_err() {
            tracing::debug!(%connection_id, "Transport closed while sending; stopping write task");
            return;
        }
    }

    let _ = sender.send(Message::Close(None)).await;
}

/// Process inbound frames in receipt order.
async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    hub: Arc<NotificationHub>,
    connection_id: ConnectionId,
    user_id: UserId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(%connection_id, error = %err, "WebSocket error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                hub.record_activity(&connection_id);

                let max_size = hub.config().max_message_size;
                if text.len() > max_size {
                    tracing::warn!(
                        %connection_id,
                        size = text.len(),
                        max = max_size,
                        "Message exceeds size limit"
                    );
                    hub.deliver_to_connection(
                        &connection_id,
                        EventMessage::error(
                            ErrorCode::MessageTooLarge,
                            format!(
                                "Message too large ({} bytes, max {} bytes)",
                                text.len(),
                                max_size
                            ),
                        ),
                    );
                    continue;
                }

                hub.route_inbound(&connection_id, &user_id, text.as_str());
            }
            Message::Pong(_) => {
                hub.record_ack(&connection_id);
            }
            Message::Ping(_) => {
                // axum answers pings automatically
            }
            Message::Binary(_) => {
                tracing::debug!(%connection_id, "Dropping unexpected binary frame");
            }
            Message::Close(_) => {
                tracing::info!(%connection_id, "Client closed connection");
                break;
            }
        }
    }
}
