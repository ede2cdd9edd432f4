use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAppointmentRequest {
    #[validate(range(min = 1))]
    pub provider_id: i64,
    /// ISO-8601 date-time; truncated to the start of its hour on save.
    #[validate(length(min = 1))]
    pub date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub id: i64,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderSummary {
    pub id: i64,
    pub name: String,
    pub avatar: Option<AvatarResponse>,
}

/// One row of the listing: the appointment plus a shallow join of the
/// provider's name and avatar.
#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentSummary {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub provider: ProviderSummary,
}
