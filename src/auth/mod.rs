// Declare submodules
pub mod auth_dto;
pub mod auth_handlers;
pub mod auth_service;
pub mod jwt;
pub mod password;

// Re-export public items
pub use jwt::{create_jwt, verify_jwt, Claims};
pub use password::verify_password;
