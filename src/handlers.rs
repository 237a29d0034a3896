pub mod admin;
pub mod auth;
pub mod clients;
pub mod photos;
pub mod reports;
pub mod sessions;
