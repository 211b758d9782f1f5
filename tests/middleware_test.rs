use std::env;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use interview_backend::middleware::auth::{require_admin, require_bearer_auth, Claims};
use interview_backend::middleware::rate_limit;
use interview_backend::utils::token::issue_token_pair;

async fn whoami(Extension(claims): Extension<Claims>) -> Json<serde_json::Value> {
    Json(json!({ "role": claims.role_str() }))
}

fn request(path: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn bearer_auth_and_role_gates() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/unused");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("FRONTEND_URL", "http://localhost:3000");
    env::set_var("DEFAULT_FROM_EMAIL", "noreply@example.com");
    interview_backend::config::init_config().expect("init config");

    let authed: Router = Router::new()
        .route("/whoami", get(whoami))
        .layer(axum::middleware::from_fn(require_bearer_auth));
    let admin_only: Router = Router::new()
        .route("/admin", get(whoami))
        .layer(axum::middleware::from_fn(require_admin));

    // No credentials.
    let resp = authed
        .clone()
        .oneshot(request("/whoami", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A valid access token passes.
    let candidate = issue_token_pair(Uuid::new_v4(), "candidate").unwrap();
    let resp = authed
        .clone()
        .oneshot(request("/whoami", Some(&candidate.access_token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Refresh tokens are rejected outside the refresh endpoint.
    let resp = authed
        .clone()
        .oneshot(request("/whoami", Some(&candidate.refresh_token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Candidates cannot reach admin routes.
    let resp = admin_only
        .clone()
        .oneshot(request("/admin", Some(&candidate.access_token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = issue_token_pair(Uuid::new_v4(), "admin").unwrap();
    let resp = admin_only
        .oneshot(request("/admin", Some(&admin.access_token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Rate limiter answers 429 past the per-second cap.
    let limited: Router = Router::new()
        .route("/health", get(interview_backend::routes::health::health))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(2),
            rate_limit::rps_middleware,
        ));
    let mut last = StatusCode::OK;
    for _ in 0..3 {
        last = limited
            .clone()
            .oneshot(request("/health", None))
            .await
            .unwrap()
            .status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}
