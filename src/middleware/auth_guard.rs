/// Request authentication guard
///
/// Wraps protected scopes: extracts the bearer access token, verifies it,
/// rejects refresh tokens presented for resource access, resolves the
/// subject to a user, and attaches the principal to the request. Terminal
/// states only: the handler runs or the request is rejected, no retries.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{verify_token, TokenType};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::find_user_by_id;

/// The authenticated user for one request-response cycle, resolved from a
/// validated access token and owned by that request alone.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

pub struct AuthGuard {
    pool: PgPool,
    jwt_config: JwtSettings,
}

impl AuthGuard {
    pub fn new(pool: PgPool, jwt_config: JwtSettings) -> Self {
        Self { pool, jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGuardService {
            service: Rc::new(service),
            pool: self.pool.clone(),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    pool: PgPool,
    jwt_config: JwtSettings,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Extract: bearer token from the Authorization header
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        let service = self.service.clone();
        let pool = self.pool.clone();
        let jwt_config = self.jwt_config.clone();

        Box::pin(async move {
            let token = match bearer {
                Some(token) if !token.is_empty() => token,
                _ => {
                    tracing::warn!("Missing or invalid Authorization header");
                    return Err(AppError::Auth(AuthError::MissingToken).into());
                }
            };

            // Verify: signature and expiry. Specifics are logged; the
            // response collapses them into the generic token codes.
            let claims = verify_token(&token, &jwt_config).map_err(Error::from)?;

            // Type-check: refresh tokens are only good for the redemption
            // endpoint, never for resource access.
            if claims.token_type != TokenType::Access {
                tracing::warn!(sub = %claims.sub, "Non-access token presented to guard");
                return Err(AppError::Auth(AuthError::WrongTokenType).into());
            }

            let user_id = claims.user_id().map_err(Error::from)?;

            // Resolve: the subject must still exist.
            let user = match find_user_by_id(&pool, user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::warn!(user_id = %user_id, "Token subject no longer exists");
                    return Err(AppError::Auth(AuthError::Unauthorized).into());
                }
                Err(e) => {
                    tracing::error!(user_id = %user_id, "User lookup failed: {}", e);
                    return Err(AppError::Auth(AuthError::Unauthorized).into());
                }
            };

            // Attach & continue
            req.extensions_mut().insert(AuthPrincipal {
                user_id: user.id,
                email: user.email,
                name: user.name,
            });

            tracing::debug!(user_id = %user_id, "Request authenticated");

            service.call(req).await
        })
    }
}
