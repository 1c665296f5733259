/// Authentication routes
///
/// Registration, login, refresh-token redemption, current-user lookup, and
/// logout. Register/login/refresh are public; me/logout sit behind the
/// auth guard.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    login as login_user, redeem_refresh_token, register as register_user,
    revoke_all_user_tokens, SignupCredential, TokenPair,
};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::middleware::AuthPrincipal;
use crate::store::User;
use crate::validators::{is_valid_email, is_valid_name};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `{user, tokens}` response for register, login, and the OAuth callback.
/// The user's password hash is stripped by its serializer.
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Serialize)]
pub struct TokensResponse {
    pub tokens: TokenPair,
}

/// POST /auth/register
///
/// Create a local account and return it with its first token pair.
///
/// # Errors
/// - 400: invalid email, name, or password
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let name = is_valid_name(&form.name)?;

    let (user, tokens) = register_user(
        pool.get_ref(),
        jwt_config.get_ref(),
        &name,
        &email,
        SignupCredential::Password(form.password.clone()),
    )
    .await?;

    Ok(HttpResponse::Created().json(AuthResponse { user, tokens }))
}

/// POST /auth/login
///
/// Authenticate with email and password.
///
/// # Errors
/// - 400: invalid email format
/// - 401: invalid credentials (same response for unknown email and
///   wrong password)
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let (user, tokens) = login_user(pool.get_ref(), jwt_config.get_ref(), &email, &form.password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse { user, tokens }))
}

/// POST /auth/refresh
///
/// Redeem a refresh token for a new pair. Rotation: the presented token is
/// consumed, so redeeming it a second time always fails.
///
/// # Errors
/// - 401: invalid, expired, wrong-type, or already-consumed token
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let tokens =
        redeem_refresh_token(pool.get_ref(), jwt_config.get_ref(), &form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokensResponse { tokens }))
}

/// GET /api/me
///
/// The authenticated user's profile, resolved by the auth guard.
pub async fn get_current_user(principal: web::ReqData<AuthPrincipal>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "id": principal.user_id.to_string(),
        "name": principal.name,
        "email": principal.email,
    }))
}

/// POST /api/logout
///
/// Revoke every live refresh token the user holds (all devices). The
/// current access token stays valid until it expires naturally.
pub async fn logout(
    principal: web::ReqData<AuthPrincipal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    revoke_all_user_tokens(pool.get_ref(), principal.user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
