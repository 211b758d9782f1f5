pub mod application;
pub mod audit_log;
pub mod invitation;
pub mod job;
pub mod notification;
pub mod screening;
pub mod skill;
pub mod user;
