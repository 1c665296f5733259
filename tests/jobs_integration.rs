use jobtrack::configuration::{get_configuration, DatabaseSettings};
use jobtrack::startup::run;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool.clone(), configuration).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

/// Register a user and return their access token.
async fn access_token_for(app: &TestApp, client: &reqwest::Client, email: &str) -> String {
    let body = json!({
        "name": "Test User",
        "email": email,
        "password": "Abc123!@"
    });

    let response = client
        .post(&format!("{}/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["tokens"]["access"]["token"]
        .as_str()
        .expect("No access token in response")
        .to_string()
}

async fn create_job(
    app: &TestApp,
    client: &reqwest::Client,
    token: &str,
    company: &str,
) -> Value {
    let body = json!({
        "company_name": company,
        "position": "Software Engineer",
        "status": "applied",
        "salary_min": 90000,
        "salary_max": 120000,
        "notes": "Referred by a friend"
    });

    let response = client
        .post(&format!("{}/api/jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn job_endpoints_require_authentication() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/jobs", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn created_jobs_are_scoped_to_their_owner() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token_a = access_token_for(&app, &client, "a@x.com").await;
    let token_b = access_token_for(&app, &client, "b@x.com").await;

    let job = create_job(&app, &client, &token_a, "Acme").await;
    let job_id = job["id"].as_str().expect("No job id");

    // Owner sees the record
    let list_a: Value = client
        .get(&format!("{}/api/jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(list_a.as_array().unwrap().len(), 1);
    assert_eq!(list_a[0]["company_name"], "Acme");

    // Another user sees nothing, and a direct fetch reads as not found
    let list_b: Value = client
        .get(&format!("{}/api/jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(list_b.as_array().unwrap().len(), 0);

    let fetch_b = client
        .get(&format!("{}/api/jobs/{}", &app.address, job_id))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, fetch_b.status().as_u16());
}

#[tokio::test]
async fn recent_jobs_returns_newest_first_capped_at_five() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, &client, "a@x.com").await;

    for i in 0..7 {
        create_job(&app, &client, &token, &format!("Company {}", i)).await;
    }

    let recent: Value = client
        .get(&format!("{}/api/jobs/recent", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");

    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["company_name"], "Company 6");
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, &client, "a@x.com").await;
    let job = create_job(&app, &client, &token, "Acme").await;
    let job_id = job["id"].as_str().expect("No job id");

    let update = json!({
        "company_name": "Acme",
        "position": "Senior Software Engineer",
        "status": "interview",
        "follow_up_date": "2026-09-01"
    });

    let updated: Value = client
        .put(&format!("{}/api/jobs/{}", &app.address, job_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&update)
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(updated["status"], "interview");
    assert_eq!(updated["position"], "Senior Software Engineer");
    assert_eq!(updated["follow_up_date"], "2026-09-01");

    let delete = client
        .delete(&format!("{}/api/jobs/{}", &app.address, job_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, delete.status().as_u16());

    let fetch = client
        .get(&format!("{}/api/jobs/{}", &app.address, job_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, fetch.status().as_u16());
}

#[tokio::test]
async fn save_list_unsave_round_trip() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, &client, "a@x.com").await;
    let job = create_job(&app, &client, &token, "Acme").await;
    let job_id = job["id"].as_str().expect("No job id");

    let saved: Value = client
        .post(&format!("{}/api/saved-jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "job_id": job_id }))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    let saved_id = saved["id"].as_str().expect("No saved id");

    let list: Value = client
        .get(&format!("{}/api/saved-jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["job_id"], job_id);
    assert_eq!(list[0]["company_name"], "Acme");

    let unsave = client
        .delete(&format!("{}/api/saved-jobs/{}", &app.address, saved_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, unsave.status().as_u16());

    // The bookmark is gone; the job itself is untouched
    let list: Value = client
        .get(&format!("{}/api/saved-jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(list.as_array().unwrap().len(), 0);

    let fetch = client
        .get(&format!("{}/api/jobs/{}", &app.address, job_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, fetch.status().as_u16());
}

#[tokio::test]
async fn saving_the_same_job_twice_is_a_conflict() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, &client, "a@x.com").await;
    let job = create_job(&app, &client, &token, "Acme").await;
    let job_id = job["id"].as_str().expect("No job id");

    let save = |client: &reqwest::Client| {
        client
            .post(&format!("{}/api/saved-jobs", &app.address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "job_id": job_id }))
            .send()
    };

    let first = save(&client).await.expect("Failed to execute request.");
    assert_eq!(201, first.status().as_u16());

    let second = save(&client).await.expect("Failed to execute request.");
    assert_eq!(409, second.status().as_u16());
}

#[tokio::test]
async fn saving_another_users_job_reads_as_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token_a = access_token_for(&app, &client, "a@x.com").await;
    let token_b = access_token_for(&app, &client, "b@x.com").await;

    let job = create_job(&app, &client, &token_a, "Acme").await;
    let job_id = job["id"].as_str().expect("No job id");

    let response = client
        .post(&format!("{}/api/saved-jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token_b))
        .json(&json!({ "job_id": job_id }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn unsaving_an_unknown_bookmark_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, &client, "a@x.com").await;

    let response = client
        .delete(&format!(
            "{}/api/saved-jobs/{}",
            &app.address,
            uuid::Uuid::new_v4()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn invalid_salary_range_is_rejected() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let token = access_token_for(&app, &client, "a@x.com").await;

    let body = json!({
        "company_name": "Acme",
        "position": "Engineer",
        "salary_min": 120000,
        "salary_max": 90000
    });

    let response = client
        .post(&format!("{}/api/jobs", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}
