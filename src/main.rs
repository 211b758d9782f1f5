use axum::{
    routing::{get, patch, post},
    Router,
};
use interview_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors, rate_limit},
    routes,
    services::{job_service::JobService, notification_service::NotificationService},
    AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    // Email outbox drain loop.
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            let notifications = NotificationService::new(state.pool.clone());
            loop {
                match notifications.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Notification worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    // Sweep that closes published jobs past their deadline.
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            let jobs = JobService::new(state.pool.clone());
            loop {
                match jobs.close_expired_jobs().await {
                    Ok(closed) if closed > 0 => {
                        info!(closed, "Closed jobs past their application deadline");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = ?e, "Job deadline sweep error");
                    }
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .route("/api/auth/verify-email", post(routes::auth::verify_email))
        .route(
            "/api/auth/password-reset/request",
            post(routes::auth::request_password_reset),
        )
        .route(
            "/api/auth/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        )
        .route("/api/public/jobs", get(routes::jobs::list_public_jobs))
        .route("/api/public/jobs/:slug", get(routes::jobs::get_public_job))
        .route(
            "/api/public/invitations/accept",
            post(routes::invitations::accept_invitation),
        )
        .route(
            "/api/public/invitations/:token",
            get(routes::invitations::get_invitation),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.api_rps),
            rate_limit::rps_middleware,
        ));

    let authed_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/users", get(routes::users::list_users))
        .route("/api/auth/change-password", post(routes::auth::change_password))
        .route("/api/users/me", patch(routes::users::update_me))
        .route(
            "/api/users/me/profile",
            get(routes::users::get_my_profile).patch(routes::users::update_my_profile),
        )
        .route("/api/users/me/stats", get(routes::users::my_stats))
        .route(
            "/api/users/me/skills",
            get(routes::users::list_my_skills).post(routes::users::add_my_skill),
        )
        .route(
            "/api/users/me/skills/:id",
            patch(routes::users::update_my_skill).delete(routes::users::remove_my_skill),
        )
        .route(
            "/api/skills",
            get(routes::skills::list_skills).post(routes::skills::create_skill),
        )
        .route(
            "/api/skills/:id",
            patch(routes::skills::update_skill).delete(routes::skills::delete_skill),
        )
        .route(
            "/api/departments",
            get(routes::skills::list_departments).post(routes::skills::create_department),
        )
        .route(
            "/api/applications",
            get(routes::applications::list_applications).post(routes::applications::apply),
        )
        .route(
            "/api/applications/:id",
            get(routes::applications::get_application),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(routes::applications::withdraw),
        )
        .route(
            "/api/screening/sessions",
            get(routes::screening::list_sessions).post(routes::screening::start_session),
        )
        .route(
            "/api/screening/sessions/:id",
            get(routes::screening::get_session),
        )
        .route(
            "/api/screening/sessions/:id/answers",
            post(routes::screening::submit_answer),
        )
        .route(
            "/api/screening/sessions/:id/complete",
            post(routes::screening::complete_session),
        )
        .route(
            "/api/screening/sessions/:id/abandon",
            post(routes::screening::abandon_session),
        )
        .route(
            "/api/screening/sessions/:id/messages",
            get(routes::screening::list_messages),
        )
        .route(
            "/api/screening/sessions/:id/result",
            get(routes::screening::get_result),
        )
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        .layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let staff_api = Router::new()
        .route("/api/users/:id", get(routes::users::get_user))
        .route(
            "/api/jobs",
            get(routes::jobs::list_jobs).post(routes::jobs::create_job),
        )
        .route(
            "/api/jobs/:id",
            get(routes::jobs::get_job)
                .patch(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        )
        .route("/api/jobs/:id/publish", post(routes::jobs::publish_job))
        .route("/api/jobs/:id/close", post(routes::jobs::close_job))
        .route("/api/jobs/:id/archive", post(routes::jobs::archive_job))
        .route(
            "/api/jobs/:id/skills",
            get(routes::jobs::list_job_skills).post(routes::jobs::attach_job_skill),
        )
        .route(
            "/api/jobs/:id/skills/:skill_id",
            axum::routing::delete(routes::jobs::detach_job_skill),
        )
        .route(
            "/api/applications/:id/status",
            patch(routes::applications::update_status),
        )
        .route(
            "/api/applications/:id/history",
            get(routes::applications::status_history),
        )
        .route(
            "/api/invitations",
            get(routes::invitations::list_invitations).post(routes::invitations::create_invitation),
        )
        .route(
            "/api/invitations/:id",
            axum::routing::delete(routes::invitations::revoke_invitation),
        )
        .layer(axum::middleware::from_fn(auth::require_hr_or_admin));

    let admin_api = Router::new()
        .route(
            "/api/users/:id/deactivate",
            post(routes::users::deactivate_user),
        )
        .route("/api/users/:id/activate", post(routes::users::activate_user))
        .route("/api/audit-logs", get(routes::notifications::list_audit_logs))
        .layer(axum::middleware::from_fn(auth::require_admin));

    let app = base_routes
        .merge(public_api)
        .merge(authed_api)
        .merge(staff_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(cors::permissive_cors())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
