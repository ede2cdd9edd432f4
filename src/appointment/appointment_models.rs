use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One booking of a provider's hour slot. `date` is always the start of
/// an hour; `canceled_at` null means the appointment is active. Rows are
/// never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub provider_id: i64,
    pub date: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }
}
