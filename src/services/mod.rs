pub mod auth_service;
pub mod membership_service;
