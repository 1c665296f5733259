/// Job application routes
///
/// Per-user CRUD over job-application records, the dashboard's
/// recent-activity feed, and saved-job bookmarks. All handlers sit behind
/// the auth guard and scope queries to the authenticated principal;
/// another user's record reads as not found.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError, ValidationError};
use crate::middleware::AuthPrincipal;

const RECENT_JOBS_LIMIT: i64 = 5;

#[derive(Deserialize)]
pub struct JobRequest {
    pub company_name: String,
    pub position: String,
    #[serde(default)]
    pub status: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct JobResponse {
    pub id: Uuid,
    pub company_name: String,
    pub position: String,
    pub status: String,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const JOB_COLUMNS: &str = "id, company_name, position, status, location, \
     salary_min, salary_max, notes, follow_up_date, created_at, updated_at";

fn validate_job(form: &JobRequest) -> Result<(), AppError> {
    if form.company_name.trim().is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "company_name".to_string(),
        )));
    }
    if form.position.trim().is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "position".to_string(),
        )));
    }
    if let (Some(min), Some(max)) = (form.salary_min, form.salary_max) {
        if min > max {
            return Err(AppError::Validation(ValidationError::InvalidFormat(
                "salary range".to_string(),
            )));
        }
    }
    Ok(())
}

/// POST /api/jobs
pub async fn create_job(
    principal: web::ReqData<AuthPrincipal>,
    form: web::Json<JobRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    validate_job(&form)?;

    let job_id = Uuid::new_v4();
    let now = Utc::now();
    let status = form.status.clone().unwrap_or_else(|| "applied".to_string());

    sqlx::query(
        r#"
        INSERT INTO jobs (id, user_id, company_name, position, status, location,
                          salary_min, salary_max, notes, follow_up_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(job_id)
    .bind(principal.user_id)
    .bind(form.company_name.trim())
    .bind(form.position.trim())
    .bind(&status)
    .bind(&form.location)
    .bind(form.salary_min)
    .bind(form.salary_max)
    .bind(&form.notes)
    .bind(form.follow_up_date)
    .bind(now)
    .bind(now)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(user_id = %principal.user_id, job_id = %job_id, "Job application recorded");

    Ok(HttpResponse::Created().json(JobResponse {
        id: job_id,
        company_name: form.company_name.trim().to_string(),
        position: form.position.trim().to_string(),
        status,
        location: form.location.clone(),
        salary_min: form.salary_min,
        salary_max: form.salary_max,
        notes: form.notes.clone(),
        follow_up_date: form.follow_up_date,
        created_at: now,
        updated_at: now,
    }))
}

/// GET /api/jobs
pub async fn list_jobs(
    principal: web::ReqData<AuthPrincipal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let jobs = sqlx::query_as::<_, JobResponse>(&format!(
        "SELECT {} FROM jobs WHERE user_id = $1 ORDER BY created_at DESC",
        JOB_COLUMNS
    ))
    .bind(principal.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(jobs))
}

/// GET /api/jobs/recent
///
/// The five most recently created records, for the dashboard activity feed.
pub async fn recent_jobs(
    principal: web::ReqData<AuthPrincipal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let jobs = sqlx::query_as::<_, JobResponse>(&format!(
        "SELECT {} FROM jobs WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        JOB_COLUMNS
    ))
    .bind(principal.user_id)
    .bind(RECENT_JOBS_LIMIT)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(jobs))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    principal: web::ReqData<AuthPrincipal>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();

    let row = sqlx::query_as::<_, JobResponse>(&format!(
        "SELECT {} FROM jobs WHERE id = $1 AND user_id = $2",
        JOB_COLUMNS
    ))
    .bind(job_id)
    .bind(principal.user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("Job not found".to_string())))?;

    Ok(HttpResponse::Ok().json(row))
}

/// PUT /api/jobs/{id}
pub async fn update_job(
    principal: web::ReqData<AuthPrincipal>,
    path: web::Path<Uuid>,
    form: web::Json<JobRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    validate_job(&form)?;

    let job_id = path.into_inner();
    let status = form.status.clone().unwrap_or_else(|| "applied".to_string());

    let row = sqlx::query_as::<_, JobResponse>(&format!(
        r#"
        UPDATE jobs
        SET company_name = $1, position = $2, status = $3, location = $4,
            salary_min = $5, salary_max = $6, notes = $7, follow_up_date = $8,
            updated_at = $9
        WHERE id = $10 AND user_id = $11
        RETURNING {}
        "#,
        JOB_COLUMNS
    ))
    .bind(form.company_name.trim())
    .bind(form.position.trim())
    .bind(&status)
    .bind(&form.location)
    .bind(form.salary_min)
    .bind(form.salary_max)
    .bind(&form.notes)
    .bind(form.follow_up_date)
    .bind(Utc::now())
    .bind(job_id)
    .bind(principal.user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| AppError::Database(DatabaseError::NotFound("Job not found".to_string())))?;

    Ok(HttpResponse::Ok().json(row))
}

#[derive(Deserialize)]
pub struct SaveJobRequest {
    pub job_id: Uuid,
}

/// A bookmark row joined with the job it points at.
#[derive(Serialize, sqlx::FromRow)]
pub struct SavedJobResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub company_name: String,
    pub position: String,
    pub status: String,
    pub location: Option<String>,
    pub saved_at: DateTime<Utc>,
}

const SAVED_JOB_COLUMNS: &str = "s.id, s.job_id, j.company_name, j.position, \
     j.status, j.location, s.created_at AS saved_at";

/// POST /api/saved-jobs
///
/// Bookmark one of the caller's job records. Saving a job that does not
/// exist (or belongs to someone else) reads as not found; saving the same
/// job twice is a conflict.
pub async fn save_job(
    principal: web::ReqData<AuthPrincipal>,
    form: web::Json<SaveJobRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let owns_job = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM jobs WHERE id = $1 AND user_id = $2)",
    )
    .bind(form.job_id)
    .bind(principal.user_id)
    .fetch_one(pool.get_ref())
    .await?;

    if !owns_job {
        return Err(AppError::Database(DatabaseError::NotFound(
            "Job not found".to_string(),
        )));
    }

    let saved_id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO saved_jobs (id, user_id, job_id, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(saved_id)
    .bind(principal.user_id)
    .bind(form.job_id)
    .bind(now)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(user_id = %principal.user_id, job_id = %form.job_id, "Job saved");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": saved_id.to_string(),
        "job_id": form.job_id.to_string(),
        "saved_at": now,
    })))
}

/// GET /api/saved-jobs
pub async fn list_saved_jobs(
    principal: web::ReqData<AuthPrincipal>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let saved = sqlx::query_as::<_, SavedJobResponse>(&format!(
        r#"
        SELECT {}
        FROM saved_jobs s
        JOIN jobs j ON j.id = s.job_id
        WHERE s.user_id = $1
        ORDER BY s.created_at DESC
        "#,
        SAVED_JOB_COLUMNS
    ))
    .bind(principal.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(saved))
}

/// DELETE /api/saved-jobs/{id}
///
/// Remove a bookmark by its own id. The job record itself is untouched.
pub async fn unsave_job(
    principal: web::ReqData<AuthPrincipal>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let saved_id = path.into_inner();

    let result = sqlx::query("DELETE FROM saved_jobs WHERE id = $1 AND user_id = $2")
        .bind(saved_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(
            "Saved job not found".to_string(),
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/jobs/{id}
pub async fn delete_job(
    principal: web::ReqData<AuthPrincipal>,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let job_id = path.into_inner();

    let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(principal.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Database(DatabaseError::NotFound(
            "Job not found".to_string(),
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}
