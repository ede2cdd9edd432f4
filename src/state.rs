use crate::appointment::appointment_service::AppointmentService;
use crate::auth::auth_service::AuthService;
use crate::locale::Locale;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub appointment_service: AppointmentService,
    pub auth_service: AuthService,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Base URL used to build public avatar file URLs.
    pub app_url: String,
    /// Locale used for the human-readable dates in booking notifications.
    pub locale: Locale,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a number"),
            app_url: std::env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            locale: std::env::var("APP_LOCALE")
                .ok()
                .as_deref()
                .and_then(Locale::from_tag)
                .unwrap_or(Locale::EnUs),
        }
    }
}
