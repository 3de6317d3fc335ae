use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::state::AppState;
use crate::crypto::{hash_password, verify_password};
use crate::db::{User, UserRepository};
use crate::error::AppError;
use crate::otp;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleRegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateOtpRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub userotp: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public view of a stored user; never carries the password hash
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Option<String>,
    pub email: String,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()),
            email: user.email,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Non-blank, trimmed value of a required field
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Unknown email, wrong password and password-less accounts all fail the same way
fn check_password(user: Option<User>, password: &str) -> Result<User, AppError> {
    let user = user.ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let matches = match user.password.as_deref() {
        Some(stored) => verify_password(password, stored).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Unusable password hash for {}: {}", user.email, e);
            false
        }),
        None => false,
    };

    if !matches {
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    Ok(user)
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let users = UserRepository::list_documents(&state.db).await?;

    if users.is_empty() {
        return Err(AppError::NotFound("No users found".to_string()));
    }

    Ok(Json(
        users
            .into_iter()
            .map(|user| bson::Bson::Document(user).into_relaxed_extjson())
            .collect(),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    };

    let user = UserRepository::get_by_email(&state.db, email.trim()).await?;
    let user = check_password(user, &password)?;

    tracing::info!("🔓 Login: {}", user.email);
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}

/// POST /api/login-google
pub async fn login_google(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = required(req.email, "Email")?;

    let user = UserRepository::get_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}

/// POST /api/register-google-user
pub async fn register_google(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GoogleRegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = required(req.email, "Email")?;
    let username = required(req.username, "Username")?;

    if UserRepository::get_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let user = UserRepository::create(&state.db, email, username, None).await?;

    tracing::info!("👤 Registered Google user {}", user.email);
    Ok(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        user: user.into(),
    }))
}

/// POST /generate-otp
pub async fn generate_otp(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GenerateOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = required(req.email, "Email")?;
    let code = otp::generate_code();

    if state.otp.arm(email.clone(), code.clone()).await {
        tracing::info!("🔁 Pending OTP replaced by a request for {}", email);
    } else {
        tracing::info!("🔐 OTP armed for {}", email);
    }

    // The slot stays armed even if delivery fails
    state.mailer.send_otp(&email, &code).await?;

    Ok(Json(MessageResponse {
        message: "OTP generated and sent successfully".to_string(),
    }))
}

/// POST /verify-otp
///
/// Registers the email captured when the code was generated, not anything
/// supplied with this request.
pub async fn verify_otp(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<VerifyOtpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let code = required(req.userotp, "OTP")?;
    let username = required(req.username, "Username")?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;

    let email = state
        .otp
        .consume(&code)
        .await
        .ok_or_else(|| AppError::Validation("Invalid OTP".to_string()))?;

    let password_hash = hash_password(&password)?;
    let user = UserRepository::create(&state.db, email, username, Some(password_hash)).await?;

    tracing::info!("👤 Registered {} after OTP verification", user.email);
    Ok(Json(AuthResponse {
        message: "OTP verification successful".to_string(),
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(password: Option<String>) -> User {
        User {
            id: Some(bson::oid::ObjectId::new()),
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password,
            created_at: None,
        }
    }

    fn auth_message(result: Result<User, AppError>) -> String {
        match result {
            Err(AppError::Auth(msg)) => msg,
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let hash = hash_password("correct horse").unwrap();

        let unknown = auth_message(check_password(None, "correct horse"));
        let wrong = auth_message(check_password(Some(user_with(Some(hash))), "battery"));
        let google = auth_message(check_password(Some(user_with(None)), "anything"));
        let corrupt = auth_message(check_password(
            Some(user_with(Some("plaintext".to_string()))),
            "plaintext",
        ));

        assert_eq!(unknown, wrong);
        assert_eq!(wrong, google);
        assert_eq!(google, corrupt);
    }

    #[test]
    fn test_login_succeeds_with_matching_password() {
        let hash = hash_password("correct horse").unwrap();
        let user = check_password(Some(user_with(Some(hash))), "correct horse").unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn test_user_response_hides_password() {
        let hash = hash_password("secret").unwrap();
        let json = serde_json::to_value(UserResponse::from(user_with(Some(hash)))).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert!(json["id"].is_string());
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(
            required(Some("   ".into()), "Email"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(required(None, "Email"), Err(AppError::Validation(_))));
        assert_eq!(required(Some(" a@x.com ".into()), "Email").unwrap(), "a@x.com");
    }
}
