pub mod applications;
pub mod auth;
pub mod health;
pub mod invitations;
pub mod jobs;
pub mod notifications;
pub mod screening;
pub mod skills;
pub mod users;
