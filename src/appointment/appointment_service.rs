use super::appointment_dto::{
    AppointmentSummary, AvatarResponse, CreateAppointmentRequest, ProviderSummary,
};
use super::appointment_models::Appointment;
use super::appointment_repository::{AppointmentListRow, AppointmentRepository};
use crate::error::{AppError, Result};
use crate::locale::format_booking_date;
use crate::notification::notification_repository::NotificationRepository;
use crate::state::Config;
use crate::user::user_repository::UserRepository;
use chrono::{DateTime, Duration, DurationRound, NaiveDateTime, Utc};
use std::sync::Arc;

/// Parses the create payload's date. Accepts RFC 3339 as well as a bare
/// `YYYY-MM-DDTHH:MM:SS` (read as UTC).
fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

/// Truncates a date-time down to the start of its containing hour.
fn start_of_hour(date: DateTime<Utc>) -> DateTime<Utc> {
    date.duration_trunc(Duration::hours(1)).unwrap_or(date)
}

/// Cancellation is only permitted while more than two hours remain
/// before the scheduled slot.
fn within_cancellation_cutoff(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    date - Duration::hours(2) < now
}

/// A user may not book themselves as a provider.
fn ensure_not_self_booking(provider_id: i64, user_id: i64) -> Result<()> {
    if provider_id == user_id {
        return Err(AppError::Unauthorized(
            "You can not create appointments for you".to_string(),
        ));
    }
    Ok(())
}

/// The truncated slot must not lie strictly before the current time.
fn ensure_future_slot(hour_start: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if hour_start < now {
        return Err(AppError::BadRequest(
            "Past date is not permitted".to_string(),
        ));
    }
    Ok(())
}

fn ensure_cancelable(appointment: &Appointment, user_id: i64, now: DateTime<Utc>) -> Result<()> {
    if appointment.user_id != user_id {
        return Err(AppError::Unauthorized(
            "You don't have permission to cancel this appointment.".to_string(),
        ));
    }
    if appointment.is_canceled() {
        return Err(AppError::BadRequest(
            "Appointment is already canceled".to_string(),
        ));
    }
    if within_cancellation_cutoff(appointment.date, now) {
        return Err(AppError::Unauthorized(
            "You can only cancel appointments 2 hours in advance.".to_string(),
        ));
    }
    Ok(())
}

/// Service layer for the appointment business rules.
#[derive(Clone)]
pub struct AppointmentService {
    appointments: AppointmentRepository,
    users: UserRepository,
    notifications: NotificationRepository,
    config: Arc<Config>,
}

impl AppointmentService {
    pub fn new(
        appointments: AppointmentRepository,
        users: UserRepository,
        notifications: NotificationRepository,
        config: Arc<Config>,
    ) -> Self {
        Self {
            appointments,
            users,
            notifications,
            config,
        }
    }

    pub async fn list_appointments(
        &self,
        user_id: i64,
        page: u32,
    ) -> Result<Vec<AppointmentSummary>> {
        let rows = self.appointments.find_page_by_user(user_id, page).await?;
        Ok(rows
            .into_iter()
            .map(|row| self.to_summary(row))
            .collect())
    }

    pub async fn create_appointment(
        &self,
        user_id: i64,
        payload: CreateAppointmentRequest,
    ) -> Result<Appointment> {
        let date = parse_iso_date(&payload.date)
            .ok_or_else(|| AppError::Validation("Validation fails".to_string()))?;

        ensure_not_self_booking(payload.provider_id, user_id)?;

        let provider = self
            .users
            .find_provider_by_id(payload.provider_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "You can only create appointments with providers".to_string(),
                )
            })?;

        let hour_start = start_of_hour(date);

        ensure_future_slot(hour_start, Utc::now())?;

        // Fast-path check; the partial unique index closes the race with a
        // concurrent create for the same slot.
        if self
            .appointments
            .find_active_by_slot(payload.provider_id, hour_start)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest(
                "Appointment date is not available".to_string(),
            ));
        }

        let appointment = self
            .appointments
            .create(user_id, payload.provider_id, hour_start)
            .await?;

        self.notify_provider(&appointment, provider.id).await;

        Ok(appointment)
    }

    pub async fn cancel_appointment(&self, user_id: i64, appointment_id: i64) -> Result<Appointment> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

        ensure_cancelable(&appointment, user_id, Utc::now())?;

        self.appointments.cancel(appointment.id, Utc::now()).await
    }

    /// Best-effort: a failed notification write is logged and never fails
    /// the booking that triggered it.
    async fn notify_provider(&self, appointment: &Appointment, provider_id: i64) {
        let result = async {
            let requester = self
                .users
                .find_by_id(appointment.user_id)
                .await?
                .ok_or(AppError::InternalError)?;

            let formatted = format_booking_date(appointment.date, self.config.locale);
            let content = format!("New booking from {} for {}", requester.name, formatted);

            self.notifications.create(provider_id, &content).await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(
                appointment_id = appointment.id,
                "Failed to record booking notification: {:?}",
                e
            );
        }
    }

    fn to_summary(&self, row: AppointmentListRow) -> AppointmentSummary {
        let avatar = match (row.avatar_id, row.avatar_path) {
            (Some(id), Some(path)) => Some(AvatarResponse {
                id,
                url: format!("{}/files/{}", self.config.app_url, path),
                path,
            }),
            _ => None,
        };

        AppointmentSummary {
            id: row.id,
            date: row.date,
            provider: ProviderSummary {
                id: row.provider_id,
                name: row.provider_name,
                avatar,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn appointment_at(date: DateTime<Utc>, user_id: i64) -> Appointment {
        Appointment {
            id: 1,
            user_id,
            provider_id: 9,
            date,
            canceled_at: None,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn truncates_to_start_of_hour() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 10, 47, 13).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(start_of_hour(date), expected);
    }

    #[test]
    fn truncation_is_idempotent() {
        let exact = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 10, 47, 0).unwrap();
        assert_eq!(start_of_hour(exact), exact);
        assert_eq!(start_of_hour(late), start_of_hour(exact));
    }

    #[test]
    fn parses_rfc3339_and_naive_dates() {
        assert_eq!(
            parse_iso_date("2025-03-01T14:30:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap())
        );
        assert_eq!(
            parse_iso_date("2025-03-01T14:30:00"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap())
        );
        assert_eq!(
            parse_iso_date("2025-03-01T11:30:00-03:00"),
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap())
        );
        assert_eq!(parse_iso_date("yesterday"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn rejects_booking_yourself_regardless_of_date() {
        let err = ensure_not_self_booking(3, 3).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn allows_booking_a_distinct_provider() {
        assert!(ensure_not_self_booking(9, 3).is_ok());
    }

    #[test]
    fn rejects_past_slot() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let err = ensure_future_slot(slot, now).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_slot_truncated_into_the_past() {
        // 10:47 truncates to 10:00, which is behind a 10:30 clock.
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        let requested = Utc.with_ymd_and_hms(2025, 3, 1, 10, 47, 0).unwrap();
        let err = ensure_future_slot(start_of_hour(requested), now).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn allows_future_slot() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        assert!(ensure_future_slot(slot, now).is_ok());
    }

    #[test]
    fn allows_slot_starting_exactly_now() {
        // Only strictly-past slots are rejected.
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert!(ensure_future_slot(now, now).is_ok());
    }

    #[test]
    fn cutoff_rejects_within_two_hours() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 13, 0, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        assert!(within_cancellation_cutoff(slot, now));
    }

    #[test]
    fn cutoff_allows_more_than_two_hours_ahead() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        assert!(!within_cancellation_cutoff(slot, now));
    }

    #[test]
    fn cancel_rejects_non_owner_regardless_of_timing() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        let appointment = appointment_at(slot, 3);
        let err = ensure_cancelable(&appointment, 4, now).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn cancel_rejects_already_canceled() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        let mut appointment = appointment_at(slot, 3);
        appointment.canceled_at = Some(now);
        let err = ensure_cancelable(&appointment, 3, now).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn cancel_rejects_inside_cutoff_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        let appointment = appointment_at(slot, 3);
        let err = ensure_cancelable(&appointment, 3, now).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn cancel_allows_owner_outside_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();
        let slot = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
        let appointment = appointment_at(slot, 3);
        assert!(ensure_cancelable(&appointment, 3, now).is_ok());
    }
}
