pub mod auth;
pub mod chat;
pub mod extract;
pub mod files;
pub mod state;

pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::storage::UPLOADS_ROUTE;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// (method, path) of every route registered in [`create_router`], for the
/// startup banner. Paths use the router's own `:param` syntax.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/api/health"),
    ("GET", "/api/users"),
    ("POST", "/api/login"),
    ("POST", "/api/login-google"),
    ("POST", "/api/register-google-user"),
    ("POST", "/generate-otp"),
    ("POST", "/verify-otp"),
    ("POST", "/api/messages"),
    ("GET", "/api/messages/:user_id/:chat_user_id"),
    ("POST", "/api/upload-file"),
    ("PATCH", "/api/toggle-like/:id"),
    ("POST", "/api/add-comment/:id"),
    ("GET", "/api/get-files"),
];

fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let origin: HeaderValue = origin
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid CORS_ORIGIN: {}", e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

pub fn create_router(state: AppState) -> Result<Router, AppError> {
    let config = state.config.clone();

    let router = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        // Users & auth
        .route("/api/users", get(auth::list_users))
        .route("/api/login", post(auth::login))
        .route("/api/login-google", post(auth::login_google))
        .route("/api/register-google-user", post(auth::register_google))
        .route("/generate-otp", post(auth::generate_otp))
        .route("/verify-otp", post(auth::verify_otp))
        // Messaging
        .route("/api/messages", post(chat::send_message))
        .route("/api/messages/:user_id/:chat_user_id", get(chat::get_conversation))
        // Files
        .route("/api/upload-file", post(files::upload_file))
        .route("/api/toggle-like/:id", patch(files::toggle_like))
        .route("/api/add-comment/:id", post(files::add_comment))
        .route("/api/get-files", get(files::list_files))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-embedder-policy"),
            HeaderValue::from_static("require-corp"),
        ))
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

async fn root() -> &'static str {
    "Server is running!"
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
