use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<bson::oid::Error> for AppError {
    fn from(err: bson::oid::Error) -> Self {
        AppError::Validation(format!("Invalid id: {}", err))
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Mail(_)
            | AppError::Storage(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Dependency failures keep their cause in `details`; client errors only carry `error`.
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(msg) | AppError::Auth(msg) | AppError::NotFound(msg) => {
                serde_json::json!({ "error": msg })
            }
            AppError::Database(err) => {
                tracing::error!("❌ Database failure: {}", err);
                serde_json::json!({ "error": "Database error", "details": err.to_string() })
            }
            AppError::Mail(details) => {
                tracing::error!("❌ Mail transport failure: {}", details);
                serde_json::json!({ "error": "Failed to send OTP email", "details": details })
            }
            AppError::Storage(details) => {
                tracing::error!("❌ Blob storage failure: {}", details);
                serde_json::json!({ "error": "Failed to store file", "details": details })
            }
            AppError::Config(msg) | AppError::Internal(msg) => {
                tracing::error!("❌ {}", msg);
                serde_json::json!({ "error": msg })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
