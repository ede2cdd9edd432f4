use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;

use super::{
    appointment_dto::{AppointmentSummary, CreateAppointmentRequest},
    appointment_models::Appointment,
};
use crate::{
    error::{AppError, Result},
    state::AppState,
};

#[derive(Deserialize)]
pub struct AppointmentFilters {
    page: Option<u32>,
}

/// List the authenticated user's upcoming appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-indexed, 20 per page)")
    ),
    responses(
        (status = 200, description = "Active appointments, ascending by date", body = [AppointmentSummary]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    filters: std::result::Result<Query<AppointmentFilters>, QueryRejection>,
) -> Result<Json<Vec<AppointmentSummary>>> {
    // A malformed page is a validation failure with the usual JSON body,
    // not the extractor's plain-text rejection.
    let Query(filters) =
        filters.map_err(|_| AppError::Validation("Validation fails".to_string()))?;
    let page = filters.page.unwrap_or(1);

    let appointments = state
        .appointment_service
        .list_appointments(user_id, page)
        .await?;

    Ok(Json(appointments))
}

/// Book a provider's hour slot
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 200, description = "Created appointment", body = Appointment),
        (status = 400, description = "Validation fails, past date or slot unavailable"),
        (status = 401, description = "Self-booking or target is not a provider")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    payload: std::result::Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>> {
    // A malformed body is a validation failure, not a framework 422.
    let Json(payload) =
        payload.map_err(|_| AppError::Validation("Validation fails".to_string()))?;
    payload
        .validate()
        .map_err(|_| AppError::Validation("Validation fails".to_string()))?;

    let appointment = state
        .appointment_service
        .create_appointment(user_id, payload)
        .await?;

    Ok(Json(appointment))
}

/// Cancel an appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(
        ("id" = i64, Path, description = "Appointment id")
    ),
    responses(
        (status = 200, description = "Canceled appointment", body = Appointment),
        (status = 401, description = "Not the owner or inside the 2 hour cutoff"),
        (status = 404, description = "Appointment not found")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Appointment>> {
    let appointment = state
        .appointment_service
        .cancel_appointment(user_id, appointment_id)
        .await?;

    Ok(Json(appointment))
}
