use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use super::error_codes::ErrorCode;
use super::types::ConnectionId;

/// Discriminant of the wire envelope.
///
/// Kinds the hub does not recognize deserialize to [`EventKind::Unknown`]
/// rather than failing, so newer clients can introduce kinds without
/// breaking older hubs. Unknown kinds are logged and dropped, never echoed
/// back as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    HealthDataUpdate,
    SyncStatusUpdate,
    AchievementUnlocked,
    CoachMessage,
    Error,
    Unknown,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HealthDataUpdate => "HEALTH_DATA_UPDATE",
            Self::SyncStatusUpdate => "SYNC_STATUS_UPDATE",
            Self::AchievementUnlocked => "ACHIEVEMENT_UNLOCKED",
            Self::CoachMessage => "COACH_MESSAGE",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn from_wire(raw: &str) -> Self {
        match raw {
            "HEALTH_DATA_UPDATE" => Self::HealthDataUpdate,
            "SYNC_STATUS_UPDATE" => Self::SyncStatusUpdate,
            "ACHIEVEMENT_UNLOCKED" => Self::AchievementUnlocked,
            "COACH_MESSAGE" => Self::CoachMessage,
            "ERROR" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wire envelope, identical in both directions:
///
/// ```json
/// { "type": "HEALTH_DATA_UPDATE", "data": { ... }, "timestamp": "2026-08-05T12:00:00Z" }
/// ```
///
/// The hub routes envelopes without interpreting their payloads, so `data`
/// stays an opaque JSON value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl EventMessage {
    pub fn new(kind: EventKind, data: serde_json::Value) -> Self {
        Self {
            kind,
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn health_data(data: serde_json::Value) -> Self {
        Self::new(EventKind::HealthDataUpdate, data)
    }

    pub fn sync_status(data: serde_json::Value) -> Self {
        Self::new(EventKind::SyncStatusUpdate, data)
    }

    pub fn achievement_unlocked(data: serde_json::Value) -> Self {
        Self::new(EventKind::AchievementUnlocked, data)
    }

    pub fn coach_message(data: serde_json::Value) -> Self {
        Self::new(EventKind::CoachMessage, data)
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            EventKind::Error,
            json!({ "code": code, "message": message.into() }),
        )
    }

    /// Initial-state push delivered to a connection right after it is
    /// admitted to the registry.
    pub fn connected(connection_id: ConnectionId) -> Self {
        Self::sync_status(json!({
            "state": "connected",
            "connection_id": connection_id.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_type_data_timestamp_fields() {
        let event = EventMessage::health_data(json!({ "steps": 1200 }));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "HEALTH_DATA_UPDATE");
        assert_eq!(value["data"]["steps"], 1200);
        // chrono serializes DateTime<Utc> as RFC 3339
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn unrecognized_kind_parses_as_unknown() {
        let raw = r#"{"type":"FUTURE_FEATURE","data":{},"timestamp":"2026-08-05T12:00:00Z"}"#;
        let event: EventMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, EventKind::Unknown);
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let raw = r#"{"type":"HEALTH_DATA_UPDATE","data":{}}"#;
        assert!(serde_json::from_str::<EventMessage>(raw).is_err());
    }

    #[test]
    fn missing_data_defaults_to_null() {
        let raw = r#"{"type":"SYNC_STATUS_UPDATE","timestamp":"2026-08-05T12:00:00Z"}"#;
        let event: EventMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, EventKind::SyncStatusUpdate);
        assert!(event.data.is_null());
    }

    #[test]
    fn error_event_carries_code_and_message() {
        let event = EventMessage::error(ErrorCode::MalformedMessage, "bad frame");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "ERROR");
        assert_eq!(value["data"]["code"], "MALFORMED_MESSAGE");
        assert_eq!(value["data"]["message"], "bad frame");
    }

    #[test]
    fn connected_push_names_the_connection() {
        let id = uuid::Uuid::new_v4();
        let event = EventMessage::connected(id);
        assert_eq!(event.kind, EventKind::SyncStatusUpdate);
        assert_eq!(event.data["connection_id"], id.to_string());
        assert_eq!(event.data["state"], "connected");
    }
}
