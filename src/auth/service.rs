/// Auth service
///
/// Orchestrates registration, login, token-pair issuance, and refresh-token
/// redemption. This is the only path by which a client obtains usable
/// tokens; routes stay thin and call into here.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::claims::TokenType;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{consume_refresh_token, save_refresh_token};
use crate::auth::token::{issue_token, verify_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::{find_user_by_email, find_user_by_id, insert_user, is_email_taken, AuthProvider, Credential, User};

/// A signed token plus its expiry in epoch seconds.
#[derive(Debug, Serialize)]
pub struct TokenWithExpiry {
    pub token: String,
    pub expires: i64,
}

/// Access + refresh pair, the wire shape returned to clients.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: TokenWithExpiry,
    pub refresh: TokenWithExpiry,
}

/// How a registering user authenticates. Federated signups carry no
/// password and must not be asked for one.
#[derive(Debug)]
pub enum SignupCredential {
    Password(String),
    Google { external_id: String },
}

/// Register a new account and return it with its first token pair.
///
/// The email check up front gives the common case a clean `EmailTaken`;
/// the unique index on `users.email` still decides under a racing
/// duplicate registration.
pub async fn register(
    pool: &PgPool,
    jwt: &JwtSettings,
    name: &str,
    email: &str,
    credential: SignupCredential,
) -> Result<(User, TokenPair), AppError> {
    if is_email_taken(pool, email).await? {
        return Err(AppError::Auth(AuthError::EmailTaken));
    }

    let credential = match credential {
        SignupCredential::Password(password) => Credential::Local {
            password_hash: hash_password(&password)?,
        },
        SignupCredential::Google { external_id } => Credential::Federated {
            provider: AuthProvider::Google,
            external_id,
        },
    };

    let user = insert_user(pool, name, email, credential).await?;
    let tokens = issue_token_pair(pool, jwt, user.id).await?;

    tracing::info!(user_id = %user.id, provider = user.provider.as_str(), "User registered");
    Ok((user, tokens))
}

/// Verify credentials and return the user with a fresh token pair.
///
/// Unknown email, federated-only account, and wrong password all fail
/// with the same `InvalidCredentials` so responses carry no signal about
/// account existence.
pub async fn login(
    pool: &PgPool,
    jwt: &JwtSettings,
    email: &str,
    password: &str,
) -> Result<(User, TokenPair), AppError> {
    let user = find_user_by_email(pool, email)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(password, password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let tokens = issue_token_pair(pool, jwt, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok((user, tokens))
}

/// Mint an access/refresh pair and persist the refresh token.
pub async fn issue_token_pair(
    pool: &PgPool,
    jwt: &JwtSettings,
    user_id: Uuid,
) -> Result<TokenPair, AppError> {
    let (access_token, access_expires) =
        issue_token(user_id, TokenType::Access, jwt.access_token_expiry, jwt)?;
    let (refresh_token, refresh_expires) =
        issue_token(user_id, TokenType::Refresh, jwt.refresh_token_expiry, jwt)?;

    save_refresh_token(pool, user_id, &refresh_token, refresh_expires).await?;

    Ok(TokenPair {
        access: TokenWithExpiry {
            token: access_token,
            expires: access_expires,
        },
        refresh: TokenWithExpiry {
            token: refresh_token,
            expires: refresh_expires,
        },
    })
}

/// Redeem a refresh token for a new pair (rotation).
///
/// Order matters: the old token is consumed before the replacement is
/// minted, so its revocation is durably visible by the time the client
/// holds the new pair. Any failure here is fatal to the session; the
/// client goes back through full login.
pub async fn redeem_refresh_token(
    pool: &PgPool,
    jwt: &JwtSettings,
    refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let claims = verify_token(refresh_token, jwt)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Auth(AuthError::WrongTokenType));
    }

    let user_id = claims.user_id()?;
    consume_refresh_token(pool, refresh_token, user_id).await?;

    let user = find_user_by_id(pool, user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::UserNotFound))?;

    let tokens = issue_token_pair(pool, jwt, user.id).await?;

    tracing::info!(user_id = %user.id, "Refresh token rotated");
    Ok(tokens)
}

/// Resolve a user by email or create a federated Google account.
/// Used by the OAuth callback; issues no tokens itself.
pub async fn find_or_create_google_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    external_id: &str,
) -> Result<User, AppError> {
    if let Some(user) = find_user_by_email(pool, email).await? {
        return Ok(user);
    }

    let user = insert_user(
        pool,
        name,
        email,
        Credential::Federated {
            provider: AuthProvider::Google,
            external_id: external_id.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Federated user created via Google");
    Ok(user)
}
