use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::protocol::UserId;

use super::AuthError;

/// Claims the hub requires from a bearer token.
///
/// `sub` carries the user identity; `exp` is enforced by the validator.
/// Additional claims in the token are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verified identity handed to the registry on successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Verifies HS256 bearer tokens against a shared secret.
///
/// Authentication is a single atomic decision made exactly once per
/// transport, before the connection is admitted to the registry.
pub struct AuthGate {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl AuthGate {
    pub fn new(secret: Option<&str>) -> Self {
        let decoding_key = match secret {
            Some(secret) if !secret.is_empty() => Some(DecodingKey::from_secret(secret.as_bytes())),
            _ => {
                tracing::warn!(
                    "No JWT secret configured; all WebSocket upgrade attempts will be rejected"
                );
                None
            }
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify the token supplied with an upgrade request and extract the
    /// embedded user identity.
    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let decoding_key = self
            .decoding_key
            .as_ref()
            .ok_or(AuthError::SecretNotConfigured)?;

        let token_data = decode::<Claims>(token, decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(AuthenticatedUser {
            user_id: token_data.claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "unit-test-secret";

    fn mint(sub: &str, ttl_secs: i64, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + ttl_secs) as usize;
        encode(
            &Header::default(),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token encoding")
    }

    #[test]
    fn valid_token_yields_embedded_user_id() {
        let gate = AuthGate::new(Some(SECRET));
        let token = mint("user-42", 300, SECRET);

        let user = gate.authenticate(Some(&token)).expect("authentication");
        assert_eq!(user.user_id, "user-42");
    }

    #[test]
    fn missing_token_is_rejected() {
        let gate = AuthGate::new(Some(SECRET));
        assert!(matches!(
            gate.authenticate(None),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            gate.authenticate(Some("")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let gate = AuthGate::new(Some(SECRET));
        let token = mint("user-42", -120, SECRET);
        assert!(matches!(
            gate.authenticate(Some(&token)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let gate = AuthGate::new(Some(SECRET));
        let token = mint("user-42", 300, "some-other-secret");
        assert!(matches!(
            gate.authenticate(Some(&token)),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let gate = AuthGate::new(Some(SECRET));
        assert!(matches!(
            gate.authenticate(Some("not-a-jwt")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn blank_subject_is_rejected() {
        let gate = AuthGate::new(Some(SECRET));
        let token = mint("  ", 300, SECRET);
        assert!(matches!(
            gate.authenticate(Some(&token)),
            Err(AuthError::MissingSubject)
        ));
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        let gate = AuthGate::new(None);
        let token = mint("user-42", 300, SECRET);
        assert!(matches!(
            gate.authenticate(Some(&token)),
            Err(AuthError::SecretNotConfigured)
        ));
    }
}
