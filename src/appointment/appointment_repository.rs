use super::appointment_models::Appointment;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// Fixed page size for the listing endpoint.
pub const PAGE_SIZE: i64 = 20;

/// Flat row returned by the listing query: the appointment joined with
/// the provider's name and avatar file.
#[derive(Debug, FromRow)]
pub struct AppointmentListRow {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub provider_id: i64,
    pub provider_name: String,
    pub avatar_id: Option<i64>,
    pub avatar_path: Option<String>,
}

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active appointments owned by `user_id`, ascending by date,
    /// windowed at `PAGE_SIZE` rows. `page` is 1-indexed.
    pub async fn find_page_by_user(
        &self,
        user_id: i64,
        page: u32,
    ) -> Result<Vec<AppointmentListRow>> {
        let offset = (page.max(1) as i64 - 1) * PAGE_SIZE;

        let rows = sqlx::query_as::<_, AppointmentListRow>(
            "SELECT a.id, a.date,
                    p.id AS provider_id, p.name AS provider_name,
                    f.id AS avatar_id, f.path AS avatar_path
             FROM appointments a
             JOIN users p ON p.id = a.provider_id
             LEFT JOIN files f ON f.id = p.avatar_id
             WHERE a.user_id = $1 AND a.canceled_at IS NULL
             ORDER BY a.date ASC
             LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(appointment)
    }

    /// Active appointment occupying the given provider/hour slot, if any.
    pub async fn find_active_by_slot(
        &self,
        provider_id: i64,
        date: DateTime<Utc>,
    ) -> Result<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments
             WHERE provider_id = $1 AND date = $2 AND canceled_at IS NULL",
        )
        .bind(provider_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(appointment)
    }

    /// Inserts a new appointment. A partial unique index on
    /// `(provider_id, date) WHERE canceled_at IS NULL` backs the slot
    /// invariant, so a concurrent create for the same slot surfaces here
    /// as a unique violation rather than a double booking.
    pub async fn create(
        &self,
        user_id: i64,
        provider_id: i64,
        date: DateTime<Utc>,
    ) -> Result<Appointment> {
        let result = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (user_id, provider_id, date)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(user_id)
        .bind(provider_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(appointment) => Ok(appointment),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::BadRequest("Appointment date is not available".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn cancel(&self, id: i64, canceled_at: DateTime<Utc>) -> Result<Appointment> {
        let appointment = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET canceled_at = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING *",
        )
        .bind(canceled_at)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }
}
