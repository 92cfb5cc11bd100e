use thiserror::Error;

/// Failures produced while verifying an upgrade-time bearer token.
///
/// Every variant results in the same outcome at the transport layer: one
/// `ERROR` event on the still-open socket, then a policy-violation close.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication token missing")]
    MissingToken,
    #[error("authentication token invalid")]
    InvalidToken,
    #[error("authentication token expired")]
    TokenExpired,
    #[error("authentication token carries no user identity")]
    MissingSubject,
    #[error("token verification is not configured on this server")]
    SecretNotConfigured,
}
