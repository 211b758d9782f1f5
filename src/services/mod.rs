pub mod application_service;
pub mod audit_service;
pub mod invitation_service;
pub mod job_service;
pub mod notification_service;
pub mod screening_service;
pub mod skill_service;
pub mod user_service;
