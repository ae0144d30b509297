//! Eventdesk API composition root.

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
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch};
use eventdesk_application::{AuthorizationService, EventService, ImageStore, ProfileService};
use eventdesk_core::AppError;
use eventdesk_infrastructure::{
    HttpIdentityProvider, IdentityProviderConfig, InMemoryImageStore, PostgresEventRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let identity_config = IdentityProviderConfig {
        issuer_base_url: required_env("IDENTITY_ISSUER_BASE_URL")?,
        client_id: required_env("IDENTITY_CLIENT_ID")?,
        client_secret: required_env("IDENTITY_CLIENT_SECRET")?,
        audience: required_env("IDENTITY_AUDIENCE")?,
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    // The identity-provider client is constructed once here and injected;
    // there is no lazily initialized global anywhere in the process.
    let identity_provider = Arc::new(HttpIdentityProvider::new(
        reqwest::Client::new(),
        identity_config,
    ));
    let authorization_service = AuthorizationService::new(identity_provider.clone());

    let event_repository = Arc::new(PostgresEventRepository::new(pool.clone()));
    // Object storage is an external collaborator; this deployment ships
    // with the in-memory adapter until a real backend is wired in.
    let image_store: Arc<dyn ImageStore> = Arc::new(InMemoryImageStore::new());
    let event_service = EventService::new(
        authorization_service.clone(),
        event_repository,
        image_store.clone(),
    );
    let profile_service = ProfileService::new(identity_provider, image_store);

    let app_state = AppState {
        authorization_service,
        event_service,
        profile_service,
        frontend_url: frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route(
            "/api/v1/events",
            get(handlers::events::list_events_handler)
                .post(handlers::events::create_event_handler)
                .put(handlers::events::update_event_handler)
                .delete(handlers::events::delete_event_handler),
        )
        .route(
            "/api/v1/profile",
            patch(handlers::profile::update_profile_handler),
        )
        .route(
            "/api/v1/session",
            get(handlers::session::session_status_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::authorize_request,
        ));

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
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, axum::http::header::AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "eventdesk-api listening");

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
