pub mod auth;
pub mod photo;
pub mod report;
pub mod session;
