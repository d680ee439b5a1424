//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded fail-fast: required variables must be present
//! and valid, or the application exits with a clear error message.

use std::env;

use thiserror::Error;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// HS256 secret shared with the upstream SSO for verifying bearer tokens.
    pub jwt_secret: String,

    /// Tracing filter directive (e.g., "info,reportage=debug").
    pub rust_log: String,

    /// Allowed CORS origins (comma-separated URLs or "*" for development).
    pub cors_origins: Vec<String>,

    /// Server bind address.
    pub host: String,

    /// Server listen port.
    pub port: u16,

    /// Root directory for uploaded report files.
    pub file_storage_root: String,

    /// Seconds between deadline-reminder sweeps.
    pub reminder_interval_secs: u64,

    /// How far ahead (in hours) the reminder sweep looks for deadlines.
    pub reminder_window_hours: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[redacted]")
            .field("jwt_secret", &"[redacted]")
            .field("rust_log", &self.rust_log)
            .field("cors_origins", &self.cors_origins)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("file_storage_root", &self.file_storage_root)
            .field("reminder_interval_secs", &self.reminder_interval_secs)
            .field("reminder_window_hours", &self.reminder_window_hours)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` - PostgreSQL connection string
    /// - `JWT_SECRET` - HS256 token verification secret (min 16 bytes)
    ///
    /// # Optional Variables
    ///
    /// - `RUST_LOG` - Log filter (default: "info")
    /// - `CORS_ORIGINS` - Comma-separated allowed origins (default: "*")
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 8080)
    /// - `FILE_STORAGE_ROOT` - Upload directory (default: "./uploads")
    /// - `REMINDER_INTERVAL_SECS` - Reminder sweep interval (default: 3600)
    /// - `REMINDER_WINDOW_HOURS` - Reminder look-ahead window (default: 24)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < 16 {
            return Err(ConfigError::InvalidValue {
                var: "JWT_SECRET".to_string(),
                message: "Secret must be at least 16 bytes".to_string(),
            });
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);
        validate_cors_origins(&cors_origins)?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let file_storage_root =
            env::var("FILE_STORAGE_ROOT").unwrap_or_else(|_| "./uploads".to_string());

        let reminder_interval_secs = env::var("REMINDER_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3600)
            .max(60);

        let reminder_window_hours = env::var("REMINDER_WINDOW_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(24)
            .max(1);

        Ok(Config {
            database_url,
            jwt_secret,
            rust_log,
            cors_origins,
            host,
            port,
            file_storage_root,
            reminder_interval_secs,
            reminder_window_hours,
        })
    }

    /// Get the server bind address as a socket address string.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Validate CORS origin URL formats at startup.
///
/// The wildcard "*" is allowed; everything else must look like an origin
/// URL with a scheme.
fn validate_cors_origins(origins: &[String]) -> Result<(), ConfigError> {
    for origin in origins {
        if origin == "*" {
            continue;
        }
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "CORS_ORIGINS".to_string(),
                message: format!(
                    "Origin '{origin}' is not a valid URL (must start with http:// or https://)"
                ),
            });
        }
        if origin.ends_with('/') {
            tracing::warn!(
                origin = %origin,
                "CORS origin has a trailing slash; origins should not end with '/'"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/reportage".to_string(),
            jwt_secret: "test-secret-at-least-16-bytes".to_string(),
            rust_log: "info".to_string(),
            cors_origins: vec!["*".to_string()],
            host: "127.0.0.1".to_string(),
            port: 3000,
            file_storage_root: "./uploads".to_string(),
            reminder_interval_secs: 3600,
            reminder_window_hours: 24,
        }
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(test_config().bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar("DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: DATABASE_URL"
        );

        let err = ConfigError::InvalidValue {
            var: "PORT".to_string(),
            message: "Must be a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for PORT: Must be a number");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("postgres://"));
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn test_cors_valid_origins_pass() {
        let origins = vec![
            "https://reports.example.gov".to_string(),
            "http://localhost:3000".to_string(),
        ];
        assert!(validate_cors_origins(&origins).is_ok());
    }

    #[test]
    fn test_cors_wildcard_passes() {
        assert!(validate_cors_origins(&["*".to_string()]).is_ok());
    }

    #[test]
    fn test_cors_invalid_origin_rejected() {
        let result = validate_cors_origins(&["not-a-url".to_string()]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a valid URL"));
    }
}
