pub mod application_dto;
pub mod auth_dto;
pub mod invitation_dto;
pub mod job_dto;
pub mod notification_dto;
pub mod screening_dto;
pub mod skill_dto;
pub mod user_dto;
