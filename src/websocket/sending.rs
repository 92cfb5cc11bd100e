use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;

use crate::protocol::EventMessage;

/// Serialize an event and write it as a text frame.
pub(super) async fn send_event_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &EventMessage,
) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize event message");
            "{\"type\":\"ERROR\",\"data\":{\"code\":\"INTERNAL_ERROR\"}}".to_string()
        }
    };

    sender.send(Message::Text(payload.into())).await
}

/// Send an error event on a socket that has not been split yet. Used for
/// the pre-registration rejection path.
pub(super) async fn send_immediate_event(
    socket: &mut WebSocket,
    event: &EventMessage,
) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize event message");
            "{\"type\":\"ERROR\",\"data\":{\"code\":\"INTERNAL_ERROR\"}}".to_string()
        }
    };

    socket.send(Message::Text(payload.into())).await
}
