use crate::error::{AppError, Result};

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash)
        .map_err(|_| AppError::Unauthorized("Invalid password".to_string()))
}
