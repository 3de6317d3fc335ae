use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub mongo_url: String,
    pub database_name: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_from: String,
    pub upload_dir: String,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    pub request_timeout_secs: u64,
    /// Unset means an armed OTP never expires.
    pub otp_ttl_secs: Option<u64>,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &str) -> Result<String, AppError> {
    std::env::var(key).map_err(|_| AppError::Config(format!("{} must be set", key)))
}

fn parsed<T>(key: &str, default: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var_or(key, default)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e)))
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let smtp_username = required("SMTP_USERNAME")?;

        let otp_ttl_secs = match std::env::var("OTP_TTL_SECS") {
            Ok(raw) => Some(
                raw.parse()
                    .map_err(|e| AppError::Config(format!("Invalid OTP_TTL_SECS: {}", e)))?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: parsed("SERVER_PORT", "8000")?,
            mongo_url: std::env::var("MONGO_URL")
                .or_else(|_| std::env::var("mongo_url"))
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database_name: var_or("DATABASE_NAME", "murari"),
            smtp_host: var_or("SMTP_HOST", "smtp.gmail.com"),
            smtp_port: parsed("SMTP_PORT", "587")?,
            smtp_password: required("SMTP_PASSWORD")?,
            mail_from: std::env::var("MAIL_FROM").unwrap_or_else(|_| smtp_username.clone()),
            smtp_username,
            upload_dir: var_or("UPLOAD_DIR", "./uploads"),
            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:8000"),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", "10485760")?,
            cors_origin: var_or("CORS_ORIGIN", "http://localhost:3000"),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", "30")?,
            otp_ttl_secs,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn otp_ttl(&self) -> Option<Duration> {
        self.otp_ttl_secs.map(Duration::from_secs)
    }

    /// Settings for tests and local tooling; no environment access.
    pub fn for_local() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            mongo_url: "mongodb://localhost:27017".to_string(),
            database_name: "murari".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "noreply@localhost".to_string(),
            smtp_password: String::new(),
            mail_from: "noreply@localhost".to_string(),
            upload_dir: "./uploads".to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            otp_ttl_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let mut config = Config::for_local();
        config.server_port = 9001;
        assert_eq!(config.server_address(), "127.0.0.1:9001");
    }

    #[test]
    fn test_otp_ttl_unset_by_default() {
        let config = Config::for_local();
        assert!(config.otp_ttl().is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
