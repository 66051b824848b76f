//! Grievance-cell API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use grievance_application::{
    AttachmentStore, DashboardService, GrievanceRepository, GrievanceService, RoleRepository,
    RoleService,
};
use grievance_core::AppError;
use grievance_infrastructure::{
    FsAttachmentStore, InMemoryAttachmentStore, InMemoryGrievanceRepository,
    InMemoryRoleRepository, PostgresGrievanceRepository, PostgresRoleRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let store_backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".to_owned());
    let required_email_domain = env::var("REQUIRED_EMAIL_DOMAIN")
        .ok()
        .filter(|value| !value.trim().is_empty());

    let (grievance_repository, role_repository): (
        Arc<dyn GrievanceRepository>,
        Arc<dyn RoleRepository>,
    ) = match store_backend.as_str() {
        "postgres" => {
            let database_url = required_env("DATABASE_URL")?;
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to run migrations: {error}"))
                })?;

            (
                Arc::new(PostgresGrievanceRepository::new(pool.clone())),
                Arc::new(PostgresRoleRepository::new(pool)),
            )
        }
        "memory" => (
            Arc::new(InMemoryGrievanceRepository::new()),
            Arc::new(InMemoryRoleRepository::new()),
        ),
        other => {
            return Err(AppError::Validation(format!(
                "STORE_BACKEND must be either 'memory' or 'postgres', got '{other}'"
            )));
        }
    };

    let attachment_store: Arc<dyn AttachmentStore> = match env::var("ATTACHMENT_ROOT") {
        Ok(root) if !root.trim().is_empty() => Arc::new(FsAttachmentStore::new(root)?),
        _ => Arc::new(InMemoryAttachmentStore::new()),
    };

    let role_service = match required_email_domain {
        Some(domain) => RoleService::with_required_domain(role_repository, domain),
        None => RoleService::new(role_repository),
    };
    let grievance_service = GrievanceService::new(grievance_repository, attachment_store);
    let dashboard_service = DashboardService::new(role_service.clone(), grievance_service.clone());

    let app_state = AppState {
        role_service,
        grievance_service,
        dashboard_service,
    };

    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::identity::me_handler))
        .route(
            "/auth/provision",
            post(handlers::identity::provision_role_handler),
        )
        .route(
            "/api/grievances",
            get(handlers::grievances::list_grievances_handler)
                .post(handlers::grievances::submit_grievance_handler),
        )
        .route(
            "/api/grievances/stream",
            get(handlers::stream::stream_grievances_handler),
        )
        .route(
            "/api/grievances/export.csv",
            get(handlers::export::export_csv_handler),
        )
        .route(
            "/api/grievances/suggest-category",
            post(handlers::grievances::suggest_category_handler),
        )
        .route(
            "/api/grievances/{id}",
            get(handlers::grievances::get_grievance_handler)
                .delete(handlers::grievances::delete_grievance_handler),
        )
        .route(
            "/api/grievances/{id}/status",
            put(handlers::grievances::update_status_handler),
        )
        .route("/api/stats/student", get(handlers::stats::student_stats_handler))
        .route("/api/stats/admin", get(handlers::stats::admin_stats_handler))
        .route_layer(from_fn(middleware::require_identity));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, backend = store_backend.as_str(), "grievance-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
