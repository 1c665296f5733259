/// Token codec
///
/// Signs and verifies the access/refresh tokens (HS256). Pure functions
/// with no side effects; safe to call from any number of request handlers.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenType};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Sign a token for `user_id` expiring `ttl_seconds` from now.
///
/// Returns the signed string together with its numeric expiry (epoch
/// seconds) so callers can persist or report it without re-decoding.
pub fn issue_token(
    user_id: Uuid,
    token_type: TokenType,
    ttl_seconds: i64,
    config: &JwtSettings,
) -> Result<(String, i64), AppError> {
    let claims = Claims::new(user_id, token_type, ttl_seconds);
    let expires = claims.exp;

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok((token, expires))
}

/// Verify signature and expiry, returning the decoded claims.
///
/// Failure modes are distinguished so callers can message users correctly
/// and clients can decide whether a silent refresh is worth attempting:
/// - structurally invalid input -> `MalformedToken`
/// - bad signature             -> `InvalidToken`
/// - past expiry               -> `ExpiredToken`
///
/// The expiry boundary is inclusive: a token whose `exp` equals the
/// current second is already expired.
pub fn verify_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below with an inclusive boundary and no leeway.
    validation.validate_exp = false;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Token validation error: {}", e);
        match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AppError::Auth(AuthError::MalformedToken),
            ErrorKind::InvalidSignature => AppError::Auth(AuthError::InvalidToken),
            ErrorKind::ExpiredSignature => AppError::Auth(AuthError::ExpiredToken),
            _ => AppError::Auth(AuthError::InvalidToken),
        }
    })?;

    if claims.exp <= chrono::Utc::now().timestamp() {
        return Err(AppError::Auth(AuthError::ExpiredToken));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    fn auth_error(result: Result<Claims, AppError>) -> AuthError {
        match result {
            Err(AppError::Auth(e)) => e,
            other => panic!("Expected auth error, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn round_trip_preserves_subject_and_type() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        for token_type in [TokenType::Access, TokenType::Refresh] {
            let (token, expires) =
                issue_token(user_id, token_type, 3600, &config).expect("Failed to issue token");
            let claims = verify_token(&token, &config).expect("Failed to verify token");

            assert_eq!(claims.sub, user_id.to_string());
            assert_eq!(claims.token_type, token_type);
            assert_eq!(claims.exp, expires);
        }
    }

    #[test]
    fn garbage_input_is_malformed() {
        let config = get_test_config();

        assert_eq!(
            auth_error(verify_token("not even close", &config)),
            AuthError::MalformedToken
        );
        assert_eq!(
            auth_error(verify_token("a.b.c", &config)),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn tampered_token_fails_signature_check() {
        let config = get_test_config();
        let (token, _) = issue_token(Uuid::new_v4(), TokenType::Access, 3600, &config)
            .expect("Failed to issue token");

        let tampered = format!("{}X", token);
        assert_eq!(
            auth_error(verify_token(&tampered, &config)),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let config = get_test_config();
        let (token, _) = issue_token(Uuid::new_v4(), TokenType::Access, 3600, &config)
            .expect("Failed to issue token");

        let mut other = get_test_config();
        other.secret = "a-completely-different-signing-secret!!".to_string();

        assert_eq!(
            auth_error(verify_token(&token, &other)),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = get_test_config();
        let (token, _) = issue_token(Uuid::new_v4(), TokenType::Access, -10, &config)
            .expect("Failed to issue token");

        assert_eq!(auth_error(verify_token(&token, &config)), AuthError::ExpiredToken);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        // ttl 0 makes exp == iat == "now"; the boundary counts as expired.
        let config = get_test_config();
        let (token, _) = issue_token(Uuid::new_v4(), TokenType::Access, 0, &config)
            .expect("Failed to issue token");

        assert_eq!(auth_error(verify_token(&token, &config)), AuthError::ExpiredToken);
    }
}
