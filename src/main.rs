use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murari_server::{
    api::{create_router, AppState, ROUTES},
    config::Config,
    db::Database,
    error::AppError,
    mail::SmtpMailer,
    otp::OtpSlot,
    storage::LocalBlobStore,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,murari_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting murari server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // No listener until the store answers; a failure here is fatal
    let db = Database::connect(&config.mongo_url, &config.database_name).await?;
    tracing::info!("✅ MongoDB connected: database '{}'", config.database_name);

    let mailer = SmtpMailer::from_config(&config)?;
    tracing::info!("✅ SMTP transport configured ({}:{})", config.smtp_host, config.smtp_port);

    let blobs = LocalBlobStore::new(&config.upload_dir, &config.public_base_url);
    tokio::fs::create_dir_all(blobs.root()).await?;
    tracing::info!("✅ Upload directory ready: {}", blobs.root().display());

    let otp = OtpSlot::new(config.otp_ttl());
    match config.otp_ttl_secs {
        Some(secs) => tracing::info!("✅ OTP slot ready (expires after {}s)", secs),
        None => tracing::info!("✅ OTP slot ready (no expiry)"),
    }

    // Create shared application state
    let state = AppState {
        db,
        mailer: Arc::new(mailer),
        blobs: Arc::new(blobs),
        otp: Arc::new(otp),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state)?;

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("📚 API Endpoints:");
    for (method, path) in ROUTES {
        tracing::info!("  {:<6} {}", method, path);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
