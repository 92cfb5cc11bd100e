use serde::{Deserialize, Serialize};

/// Error codes carried in the payload of `ERROR` events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AuthenticationFailed,
    MalformedMessage,
    MessageTooLarge,
    InternalError,
}

impl ErrorCode {
    /// Human-readable description suitable for client display.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => {
                "Authentication failed. The token is missing, invalid, or expired."
            }
            Self::MalformedMessage => "The message could not be parsed as an event envelope.",
            Self::MessageTooLarge => "The message exceeds the maximum allowed size.",
            Self::InternalError => "An internal server error occurred.",
        }
    }
}
