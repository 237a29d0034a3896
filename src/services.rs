pub mod auth;
pub mod document_service;
pub mod file_storage;
pub mod photo_service;
pub mod report_service;
pub mod route_aggregator;
pub mod session_service;
