use crate::{
    appointment::appointment_dto::{AppointmentSummary, AvatarResponse, CreateAppointmentRequest, ProviderSummary},
    appointment::appointment_handlers,
    appointment::appointment_models::Appointment,
    auth::auth_dto::{SessionRequest, SessionResponse},
    auth::auth_handlers,
    middleware::auth_middleware,
    state::AppState,
    user::user_models::UserResponse,
};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::create_session,
        appointment_handlers::list_appointments,
        appointment_handlers::create_appointment,
        appointment_handlers::cancel_appointment,
    ),
    components(
        schemas(
            SessionRequest,
            SessionResponse,
            CreateAppointmentRequest,
            Appointment,
            AppointmentSummary,
            ProviderSummary,
            AvatarResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "sessions", description = "Session endpoints"),
        (name = "appointments", description = "Appointment booking endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let session_routes = Router::new().route("/", post(auth_handlers::create_session));

    // Protected routes (auth required)
    let appointment_routes = Router::new()
        .route(
            "/",
            get(appointment_handlers::list_appointments)
                .post(appointment_handlers::create_appointment),
        )
        .route("/:id", delete(appointment_handlers::cancel_appointment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/sessions", session_routes)
        .nest("/appointments", appointment_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::appointment_repository::AppointmentRepository;
    use crate::appointment::appointment_service::AppointmentService;
    use crate::auth::auth_service::AuthService;
    use crate::auth::create_jwt;
    use crate::locale::Locale;
    use crate::notification::notification_repository::NotificationRepository;
    use crate::state::Config;
    use crate::user::user_repository::UserRepository;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    const TEST_SECRET: &str = "test-secret";

    // Lazy pool: never connects, which is fine for requests rejected
    // before any query runs.
    fn test_state() -> AppState {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/booking_test")
            .unwrap();
        let config = Arc::new(Config {
            jwt_secret: TEST_SECRET.to_string(),
            jwt_expiration_hours: 1,
            app_url: "http://localhost:3000".to_string(),
            locale: Locale::EnUs,
        });
        let users = UserRepository::new(pool.clone());
        let appointments = AppointmentRepository::new(pool.clone());
        let notifications = NotificationRepository::new(pool);
        AppState {
            config: config.clone(),
            appointment_service: AppointmentService::new(
                appointments,
                users.clone(),
                notifications,
                config.clone(),
            ),
            auth_service: AuthService::new(users, config),
        }
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn malformed_page_query_gets_json_validation_error() {
        let app = create_router(test_state());
        let token = create_jwt(1, TEST_SECRET, 1).unwrap();

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments?page=abc")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Validation fails");
    }

    #[tokio::test]
    async fn malformed_create_body_gets_json_validation_error() {
        let app = create_router(test_state());
        let token = create_jwt(1, TEST_SECRET, 1).unwrap();

        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/appointments")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"provider_id\":"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Validation fails");
    }

    #[tokio::test]
    async fn missing_token_gets_json_unauthorized() {
        let app = create_router(test_state());

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"], "Invalid credentials");
    }
}
