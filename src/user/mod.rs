// Declare submodules
pub mod user_models;
pub mod user_repository;
