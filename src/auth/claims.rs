/// Token claims
///
/// Payload shared by access and refresh tokens: subject, issued-at,
/// expiry, and a type discriminator telling the two apart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Discriminates access tokens (short-lived, stateless) from refresh
/// tokens (longer-lived, persisted in the ledger, single-use).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type discriminator
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl Claims {
    /// Build claims expiring `ttl_seconds` from now.
    pub fn new(user_id: Uuid, token_type: TokenType, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
            token_type,
        }
    }

    /// Extract the subject as a UUID.
    ///
    /// A well-formed signature over a non-UUID subject still fails here;
    /// the caller treats it as an invalid token.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::InvalidToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_subject_and_type() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access, 3600);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Refresh, 3600);

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn invalid_subject_is_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), TokenType::Access, 3600);
        claims.sub = "not-a-uuid".to_string();

        assert!(claims.user_id().is_err());
    }

    #[test]
    fn token_type_serializes_lowercase() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Refresh, 60);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["type"], "refresh");
    }
}
