//! Configuration management for the backend
//!
//! Configuration is loaded once at startup from environment variables
//! (optionally seeded from a `.env` file) and validated before the server
//! binds. A missing or weak JWT secret is a startup failure, never a
//! per-request error.

use crate::utils::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Main configuration struct for the backend
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Upload storage configuration
    pub uploads: UploadConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Allowed CORS origins (empty means same-origin only)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (postgres://... or sqlite://...)
    pub url: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Connect timeout in seconds
    pub connect_timeout: u64,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub token_lifetime: u64,
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root directory for uploaded files
    pub root_dir: String,
    /// Maximum accepted photo size in bytes
    pub max_photo_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/academix.db?mode=rwc".to_string(),
            max_connections: 10,
            connect_timeout: 10,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root_dir: "uploads".to_string(),
            max_photo_bytes: 3 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let server = ServerConfig {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 5000)?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| ServerConfig::default().cors_origins),
        };

        let database = DatabaseConfig {
            url: env_or("DATABASE_URL", &DatabaseConfig::default().url),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
            connect_timeout: env_parse("DATABASE_CONNECT_TIMEOUT", 10)?,
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| ApiError::config("JWT_SECRET must be set"))?,
            // 12 hours, matching ACCESS_TOKEN_EXPIRES_IN from the legacy deployment
            token_lifetime: env_parse("TOKEN_LIFETIME_SECS", 12 * 3600)?,
        };

        let uploads = UploadConfig {
            root_dir: env_or("UPLOAD_DIR", "uploads"),
            max_photo_bytes: env_parse("MAX_PHOTO_BYTES", 3 * 1024 * 1024)?,
        };

        let config = Self {
            server,
            database,
            auth,
            uploads,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration; called once at startup
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(ApiError::config(
                "JWT_SECRET must be at least 32 characters long",
            ));
        }
        if self.auth.token_lifetime < 300 {
            return Err(ApiError::config(
                "TOKEN_LIFETIME_SECS must be at least 5 minutes (300 seconds)",
            ));
        }
        if self.database.url.is_empty() {
            return Err(ApiError::config("DATABASE_URL must not be empty"));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ApiError::config(format!("{} has an invalid value", key))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
                token_lifetime: 3600,
            },
            uploads: UploadConfig::default(),
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = base_config();
        config.auth.jwt_secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_tiny_lifetime() {
        let mut config = base_config();
        config.auth.token_lifetime = 60;
        assert!(matches!(config.validate(), Err(ApiError::Config(_))));
    }
}
