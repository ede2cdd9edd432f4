mod appointment;
mod auth;
mod db;
mod error;
mod locale;
mod middleware;
mod notification;
mod routes;
mod state;
mod user;

use db::{create_pool, run_migrations};
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booking_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Create repositories
    let user_repository = user::user_repository::UserRepository::new(db.clone());
    let appointment_repository =
        appointment::appointment_repository::AppointmentRepository::new(db.clone());
    let notification_repository =
        notification::notification_repository::NotificationRepository::new(db.clone());

    // Create services
    let appointment_service = appointment::appointment_service::AppointmentService::new(
        appointment_repository,
        user_repository.clone(),
        notification_repository,
        config.clone(),
    );
    let auth_service = auth::auth_service::AuthService::new(user_repository, config.clone());

    // Create application state
    let state = AppState {
        config: config.clone(),
        appointment_service,
        auth_service,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
