/// Refresh token ledger
///
/// Every issued refresh token gets one row here; a token is redeemable only
/// while its row is live (not revoked, not expired). Rotation consumes the
/// row with a single conditional update, so when two redemptions race on
/// the same token at most one can win.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::claims::TokenType;
use crate::error::{AppError, AuthError};

/// A live ledger row, as returned by a successful consume.
#[derive(Debug)]
pub struct StoredRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Persist a newly issued refresh token. `expires` is the token's numeric
/// expiry in epoch seconds, as returned by the codec.
pub async fn save_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    token: &str,
    expires: i64,
) -> Result<(), AppError> {
    let expires_at = DateTime::<Utc>::from_timestamp(expires, 0)
        .ok_or_else(|| AppError::Internal(format!("Invalid token expiry: {}", expires)))?;

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, token, user_id, token_type, expires_at, is_revoked, created_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(token)
    .bind(user_id)
    .bind(TokenType::Refresh.as_str())
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Atomically revoke and return the live row for `token`, enforcing
/// at-most-one-use semantics.
///
/// The conditional `is_revoked = FALSE` guard makes this the correctness
/// boundary for rotation: a second redemption of the same token matches no
/// row and fails with `RefreshTokenInvalid`, which always signals that the
/// client must re-authenticate.
pub async fn consume_refresh_token(
    pool: &PgPool,
    token: &str,
    user_id: Uuid,
) -> Result<StoredRefreshToken, AppError> {
    let row = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>)>(
        r#"
        UPDATE refresh_tokens
        SET is_revoked = TRUE, revoked_at = $1
        WHERE token = $2
          AND user_id = $3
          AND token_type = $4
          AND is_revoked = FALSE
        RETURNING id, user_id, expires_at
        "#,
    )
    .bind(Utc::now())
    .bind(token)
    .bind(user_id)
    .bind(TokenType::Refresh.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        None => {
            tracing::warn!(user_id = %user_id, "Refresh token not found or already consumed");
            Err(AppError::Auth(AuthError::RefreshTokenInvalid))
        }
        Some((id, user_id, expires_at)) => {
            // The signature check already rejects expired tokens; the row
            // check covers clock drift between issuance and storage.
            if expires_at <= Utc::now() {
                tracing::info!(user_id = %user_id, "Refresh token row expired");
                return Err(AppError::Auth(AuthError::RefreshTokenInvalid));
            }

            Ok(StoredRefreshToken { id, user_id, expires_at })
        }
    }
}

/// Revoke every live refresh token a user holds (logout on all devices).
pub async fn revoke_all_user_tokens(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET is_revoked = TRUE, revoked_at = $1
        WHERE user_id = $2 AND is_revoked = FALSE
        "#,
    )
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user_id, "All refresh tokens revoked for user");
    Ok(())
}
