// Declare submodules
pub mod notification_models;
pub mod notification_repository;
