/// User records
///
/// A user is either a local account (email + password hash) or a federated
/// one (provider + external id, no password). The credential variant makes
/// the "local must have a password hash" invariant explicit at write time;
/// the schema repeats it as a CHECK constraint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AuthError, ValidationError};

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Local => "local",
            AuthProvider::Google => "google",
        }
    }

    fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "local" => Ok(AuthProvider::Local),
            "google" => Ok(AuthProvider::Google),
            other => Err(AppError::Internal(format!("Unknown auth provider: {}", other))),
        }
    }
}

/// How a new account authenticates. The password hash is produced by the
/// caller; this layer never sees plaintext.
#[derive(Debug)]
pub enum Credential {
    Local { password_hash: String },
    Federated { provider: AuthProvider, external_id: String },
}

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Absent for federated accounts. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub provider: AuthProvider,
    #[serde(skip_serializing)]
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

type UserRow = (
    Uuid,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    DateTime<Utc>,
);

fn row_to_user(row: UserRow) -> Result<User, AppError> {
    let (id, name, email, password_hash, provider, external_id, created_at) = row;
    Ok(User {
        id,
        name,
        email,
        password_hash,
        provider: AuthProvider::parse(&provider)?,
        external_id,
        created_at,
    })
}

/// Existence check used during registration. An optimization only: under
/// concurrent registration the unique index decides, not this query.
pub async fn is_email_taken(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Insert a new user and return the created record.
pub async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    credential: Credential,
) -> Result<User, AppError> {
    let (password_hash, provider, external_id) = match credential {
        Credential::Local { password_hash } => {
            if password_hash.is_empty() {
                return Err(AppError::Validation(ValidationError::EmptyField(
                    "password".to_string(),
                )));
            }
            (Some(password_hash), AuthProvider::Local, None)
        }
        Credential::Federated { provider, external_id } => {
            (None, provider, Some(external_id))
        }
    };

    let user_id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, provider, external_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(provider.as_str())
    .bind(&external_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match &e {
        // Losing the race against a concurrent registration reads the same
        // as the up-front existence check.
        sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
            AppError::Auth(AuthError::EmailTaken)
        }
        _ => AppError::from(e),
    })?;

    Ok(User {
        id: user_id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
        provider,
        external_id,
        created_at: now,
    })
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, password_hash, provider, external_id, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(row_to_user).transpose()
}

pub async fn find_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, email, password_hash, provider, external_id, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(row_to_user).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_text() {
        for provider in [AuthProvider::Local, AuthProvider::Google] {
            assert_eq!(AuthProvider::parse(provider.as_str()).unwrap(), provider);
        }
        assert!(AuthProvider::parse("github").is_err());
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            password_hash: Some("$2b$12$secret".to_string()),
            provider: AuthProvider::Local,
            external_id: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["provider"], "local");
    }
}
