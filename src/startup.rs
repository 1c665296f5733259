use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::middleware::{AuthGuard, RequestLogger};
use crate::routes::{
    create_job, delete_job, get_current_user, get_job, google_callback, google_login,
    health_check, list_jobs, list_saved_jobs, login, logout, recent_jobs, refresh, register,
    save_job, submit_contact, unsave_job, update_job,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let email_client = EmailClient::from_settings(&settings.email).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let connection = web::Data::new(connection);
    let jwt_config = settings.jwt.clone();
    let jwt_config_data = web::Data::new(settings.jwt);
    let google_config_data = web::Data::new(settings.google);
    let email_client_data = web::Data::new(email_client);
    // One outbound HTTP client shared across workers
    let http_client_data = web::Data::new(reqwest::Client::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            .app_data(google_config_data.clone())
            .app_data(email_client_data.clone())
            .app_data(http_client_data.clone())

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/google", web::get().to(google_login))
            .route("/auth/google/callback", web::get().to(google_callback))
            .route("/contact", web::post().to(submit_contact))

            // Protected routes (access token required)
            .service(
                web::scope("/api")
                    .wrap(AuthGuard::new(
                        connection.get_ref().clone(),
                        jwt_config.clone(),
                    ))
                    .route("/me", web::get().to(get_current_user))
                    .route("/logout", web::post().to(logout))
                    .route("/jobs", web::post().to(create_job))
                    .route("/jobs", web::get().to(list_jobs))
                    .route("/jobs/recent", web::get().to(recent_jobs))
                    .route("/saved-jobs", web::post().to(save_job))
                    .route("/saved-jobs", web::get().to(list_saved_jobs))
                    .route("/saved-jobs/{id}", web::delete().to(unsave_job))
                    .route("/jobs/{id}", web::get().to(get_job))
                    .route("/jobs/{id}", web::put().to(update_job))
                    .route("/jobs/{id}", web::delete().to(delete_job)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
