use super::auth_dto::{SessionRequest, SessionResponse};
use crate::{error::Result, state::AppState};
use axum::{extract::State, Json};
use validator::Validate;

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<SessionResponse>> {
    payload.validate()?;

    let (user, token) = state
        .auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(SessionResponse {
        token,
        user: user.into(),
    }))
}
