/// Contact form route
///
/// Persists a visitor message and forwards it to the site owner by email.
/// Public; entirely separate from the auth paths.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::email_client::EmailClient;
use crate::error::AppError;
use crate::validators::{is_valid_email, is_valid_message, is_valid_name};

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// POST /contact
///
/// # Errors
/// - 400: invalid name, email, or message
/// - 503: email service unavailable
pub async fn submit_contact(
    form: web::Json<ContactRequest>,
    pool: web::Data<PgPool>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;
    let email = is_valid_email(&form.email)?;
    let message = is_valid_message(&form.message)?;

    let contact_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO contacts (id, name, email, message, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(contact_id)
    .bind(&name)
    .bind(&email)
    .bind(&message)
    .bind(Utc::now())
    .execute(pool.get_ref())
    .await?;

    email_client
        .forward_contact_message(&name, &email, &message)
        .await?;

    tracing::info!(contact_id = %contact_id, "Contact message forwarded");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Contact message sent successfully",
        "id": contact_id.to_string(),
    })))
}
