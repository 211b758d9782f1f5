use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use interview_backend::dto::application_dto::ApplyPayload;
use interview_backend::dto::invitation_dto::{AcceptInvitationPayload, CreateInvitationPayload};
use interview_backend::dto::job_dto::CreateJobPayload;
use interview_backend::services::application_service::ApplicationService;
use interview_backend::services::invitation_service::InvitationService;
use interview_backend::services::job_service::JobService;
use interview_backend::utils::token::issue_token_pair;

async fn setup_pool() -> PgPool {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("FRONTEND_URL", "http://localhost:3000");
    env::set_var("DEFAULT_FROM_EMAIL", "noreply@example.com");
    let _ = interview_backend::config::init_config();

    let pool = interview_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

async fn seed_user(pool: &PgPool, role: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, role, is_verified) \
         VALUES ($1, $2, 'not-a-real-hash', 'Test', 'User', $3, TRUE)",
    )
    .bind(id)
    .bind(format!("{}_{}@example.com", role, id))
    .bind(role)
    .execute(pool)
    .await
    .expect("seed user");
    id
}

fn job_payload(title: &str) -> CreateJobPayload {
    CreateJobPayload {
        title: title.to_string(),
        description: "Build and maintain backend services.".to_string(),
        requirements: None,
        responsibilities: None,
        benefits: None,
        department_id: None,
        employment_type: None,
        experience_level: None,
        work_model: None,
        location: None,
        salary_min: None,
        salary_max: None,
        salary_currency: None,
        application_deadline: None,
        max_applications: None,
        enable_ai_screening: None,
        screening_questions: None,
    }
}

async fn seed_published_job(pool: &PgPool, created_by: Uuid) -> Uuid {
    let jobs = JobService::new(pool.clone());
    let job = jobs
        .create_job(created_by, job_payload(&format!("Backend Engineer {}", Uuid::new_v4())))
        .await
        .expect("create job");
    jobs.publish_job(job.id).await.expect("publish job");
    job.id
}

#[tokio::test]
#[ignore = "requires a Postgres instance at DATABASE_URL"]
async fn status_updates_append_one_history_row_each() {
    let pool = setup_pool().await;
    let hr = seed_user(&pool, "hr").await;
    let candidate = seed_user(&pool, "candidate").await;
    let job_id = seed_published_job(&pool, hr).await;

    let applications = ApplicationService::new(pool.clone());
    let application = applications
        .apply(
            candidate,
            ApplyPayload {
                job_id,
                cover_letter: None,
                portfolio_url: None,
                additional_info: None,
            },
        )
        .await
        .expect("apply");

    for status in ["under_review", "shortlisted", "rejected"] {
        applications
            .update_status(application.id, status, Some("reviewed"), Some(hr))
            .await
            .expect("update status");
    }

    let history = applications
        .status_history(application.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].new_status, "rejected");
    assert_eq!(history[2].old_status, "pending");

    let reloaded = applications
        .get_application(application.id)
        .await
        .expect("reload");
    assert_eq!(reloaded.status, "rejected");

    // The ownership and pipeline-stage guard runs on the locked row, so a
    // withdraw after a terminal transition fails without adding history.
    assert!(applications.withdraw(application.id, candidate).await.is_err());
    let history = applications
        .status_history(application.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 3);
}

#[tokio::test]
#[ignore = "requires a Postgres instance at DATABASE_URL"]
async fn expired_and_spent_invitations_are_rejected() {
    let pool = setup_pool().await;
    let hr = seed_user(&pool, "hr").await;
    let invitations = InvitationService::new(pool.clone());

    // Expired token: inserted directly, one day past its deadline.
    let expired_token = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO invitations (email, role, token, invited_by, expires_at) \
         VALUES ($1, 'interviewer', $2, $3, $4)",
    )
    .bind(format!("expired_{}@example.com", expired_token))
    .bind(expired_token)
    .bind(hr)
    .bind(Utc::now() - Duration::days(1))
    .execute(&pool)
    .await
    .expect("seed expired invitation");

    let accept = |token: Uuid| AcceptInvitationPayload {
        token,
        password: "password123".to_string(),
        first_name: "Invited".to_string(),
        last_name: "Staff".to_string(),
    };
    assert!(invitations.accept(accept(expired_token)).await.is_err());

    // A fresh invitation accepts exactly once.
    let invitation = invitations
        .create(
            hr,
            CreateInvitationPayload {
                email: format!("invited_{}@example.com", Uuid::new_v4()),
                role: "interviewer".to_string(),
                message: None,
                expires_in_days: Some(7),
            },
        )
        .await
        .expect("create invitation");

    let tokens = invitations
        .accept(accept(invitation.token))
        .await
        .expect("first accept");
    assert_eq!(tokens.user.role, "interviewer");

    assert!(invitations.accept(accept(invitation.token)).await.is_err());

    let spent = invitations
        .get_by_token(invitation.token)
        .await
        .expect("reload invitation");
    assert!(spent.is_accepted);
}

#[tokio::test]
#[ignore = "requires a Postgres instance at DATABASE_URL"]
async fn user_list_is_self_scoped_for_candidates() {
    let pool = setup_pool().await;
    let hr = seed_user(&pool, "hr").await;
    let candidate = seed_user(&pool, "candidate").await;

    let app_state = interview_backend::AppState::new(pool.clone());
    let app: Router = Router::new()
        .route("/api/users", get(interview_backend::routes::users::list_users))
        .layer(axum::middleware::from_fn(
            interview_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(app_state);

    let list_as = |user_id: Uuid, role: &str| {
        let token = issue_token_pair(user_id, role).unwrap().access_token;
        Request::builder()
            .uri("/api/users")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let resp = app
        .clone()
        .oneshot(list_as(candidate, "candidate"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["id"], candidate.to_string());

    let resp = app.oneshot(list_as(hr, "hr")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    assert!(json["total"].as_i64().unwrap() >= 2);
}
