/// Google OAuth routes
///
/// Federated login: /auth/google sends the browser to Google's consent
/// screen; the callback exchanges the authorization code, resolves or
/// creates the user by email, and issues a token pair exactly as local
/// login does.

use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{find_or_create_google_user, issue_token_pair};
use crate::configuration::{GoogleSettings, JwtSettings};
use crate::error::{AppError, AuthError};
use crate::routes::auth::AuthResponse;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: String,
    name: Option<String>,
}

/// GET /auth/google
///
/// Redirect to Google's consent screen.
pub async fn google_login(google_config: web::Data<GoogleSettings>) -> HttpResponse {
    let url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
        GOOGLE_AUTH_URL,
        urlencoding::encode(&google_config.client_id),
        urlencoding::encode(&google_config.redirect_uri),
        urlencoding::encode("openid email profile"),
    );

    HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish()
}

/// GET /auth/google/callback
///
/// Exchange the authorization code, resolve or create the user, and return
/// `{user, tokens}` like local login.
///
/// # Errors
/// - 401: consent denied, missing code, or failed exchange
pub async fn google_callback(
    query: web::Query<CallbackQuery>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
    google_config: web::Data<GoogleSettings>,
    http_client: web::Data<reqwest::Client>,
) -> Result<HttpResponse, AppError> {
    if let Some(error) = &query.error {
        tracing::warn!(error = %error, "Google consent denied");
        return Err(AppError::Auth(AuthError::Unauthorized));
    }

    let code = query
        .code
        .as_deref()
        .ok_or(AppError::Auth(AuthError::Unauthorized))?;

    let profile = fetch_google_profile(http_client.get_ref(), code, google_config.get_ref()).await?;
    let name = profile.name.unwrap_or_else(|| profile.email.clone());

    let user =
        find_or_create_google_user(pool.get_ref(), &name, &profile.email, &profile.id).await?;
    let tokens = issue_token_pair(pool.get_ref(), jwt_config.get_ref(), user.id).await?;

    tracing::info!(user_id = %user.id, "Google login completed");
    Ok(HttpResponse::Ok().json(AuthResponse { user, tokens }))
}

async fn fetch_google_profile(
    client: &reqwest::Client,
    code: &str,
    config: &GoogleSettings,
) -> Result<GoogleUserInfo, AppError> {
    let exchange = client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("code", code),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Google token exchange unreachable: {}", e);
            AppError::Auth(AuthError::Unauthorized)
        })?
        .error_for_status()
        .map_err(|e| {
            tracing::warn!("Google rejected the authorization code: {}", e);
            AppError::Auth(AuthError::Unauthorized)
        })?
        .json::<TokenExchangeResponse>()
        .await
        .map_err(|e| {
            tracing::error!("Unexpected token exchange payload: {}", e);
            AppError::Auth(AuthError::Unauthorized)
        })?;

    client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(&exchange.access_token)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Google userinfo unreachable: {}", e);
            AppError::Auth(AuthError::Unauthorized)
        })?
        .error_for_status()
        .map_err(|e| {
            tracing::warn!("Google userinfo rejected the access token: {}", e);
            AppError::Auth(AuthError::Unauthorized)
        })?
        .json::<GoogleUserInfo>()
        .await
        .map_err(|e| {
            tracing::error!("Unexpected userinfo payload: {}", e);
            AppError::Auth(AuthError::Unauthorized)
        })
}
