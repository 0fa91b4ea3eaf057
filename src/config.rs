use crate::application::services::certificate_service::DEFAULT_CODE_MAX_ATTEMPTS;
use crate::domain::services::certificate_code::DEFAULT_CODE_PREFIX;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
    pub session_duration_hours: i64,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
    /// Two uppercase letters leading every certificate code.
    pub certificate_code_prefix: String,
    /// How many codes to try before giving up on a collision streak.
    pub certificate_code_max_attempts: u32,
    pub login_max_attempts: u32,
    pub login_window_minutes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://coursehub.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let admin_email = env::var("ADMIN_EMAIL").map_err(|_| ConfigError::MissingAdminEmail)?;

        let admin_password =
            env::var("ADMIN_PASSWORD").map_err(|_| ConfigError::MissingAdminPassword)?;

        let admin_name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());

        let session_duration_hours = env::var("SESSION_DURATION_HOURS")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .unwrap_or(9);

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "coursehub".to_string());

        let metrics_port = env::var("METRICS_PORT")
            .unwrap_or_else(|_| "9000".to_string())
            .parse()
            .unwrap_or(9000);

        let certificate_code_prefix = env::var("CERTIFICATE_CODE_PREFIX")
            .unwrap_or_else(|_| DEFAULT_CODE_PREFIX.to_string());
        if certificate_code_prefix.len() != 2
            || !certificate_code_prefix
                .chars()
                .all(|c| c.is_ascii_uppercase())
        {
            return Err(ConfigError::InvalidCodePrefix(certificate_code_prefix));
        }

        let certificate_code_max_attempts = match env::var("CERTIFICATE_CODE_MAX_ATTEMPTS") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidCodeAttempts)?,
            Err(_) => DEFAULT_CODE_MAX_ATTEMPTS,
        };

        let login_max_attempts = env::var("LOGIN_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let login_window_minutes = env::var("LOGIN_WINDOW_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);

        Ok(Config {
            database_url,
            server_host,
            server_port,
            admin_email,
            admin_password,
            admin_name,
            session_duration_hours,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
            certificate_code_prefix,
            certificate_code_max_attempts,
            login_max_attempts,
            login_window_minutes,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ADMIN_EMAIL environment variable not set")]
    MissingAdminEmail,

    #[error("ADMIN_PASSWORD environment variable not set")]
    MissingAdminPassword,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("CERTIFICATE_CODE_PREFIX must be two uppercase letters, got '{0}'")]
    InvalidCodePrefix(String),

    #[error("CERTIFICATE_CODE_MAX_ATTEMPTS must be a positive integer")]
    InvalidCodeAttempts,
}
