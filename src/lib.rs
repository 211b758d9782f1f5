pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, audit_service::AuditService,
    invitation_service::InvitationService, job_service::JobService,
    notification_service::NotificationService, screening_service::ScreeningService,
    skill_service::SkillService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub skill_service: SkillService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub screening_service: ScreeningService,
    pub invitation_service: InvitationService,
    pub notification_service: NotificationService,
    pub audit_service: AuditService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_service = UserService::new(pool.clone());
        let skill_service = SkillService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let screening_service = ScreeningService::new(pool.clone());
        let invitation_service = InvitationService::new(pool.clone());
        let notification_service = NotificationService::new(pool.clone());
        let audit_service = AuditService::new(pool.clone());

        Self {
            pool,
            user_service,
            skill_service,
            job_service,
            application_service,
            screening_service,
            invitation_service,
            notification_service,
            audit_service,
        }
    }
}
