use crate::auth::{create_jwt, verify_password};
use crate::error::{AppError, Result};
use crate::state::Config;
use crate::user::user_models::User;
use crate::user::user_repository::UserRepository;
use std::sync::Arc;

/// Issues JWTs for known users. Account creation and profile updates are
/// owned by a separate account-management service.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(users: UserRepository, config: Arc<Config>) -> Self {
        Self { users, config }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = create_jwt(
            user.id,
            &self.config.jwt_secret,
            self.config.jwt_expiration_hours,
        )?;

        Ok((user, token))
    }
}
