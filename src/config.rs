//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Frontend assets directory
    pub frontend_dir: String,
    /// Session expiration in hours
    pub session_expiry_hours: i64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
    /// Environment (development/production)
    pub environment: Environment,
    /// Trusted proxy IP prefixes (e.g., ["10.0.0.", "172.16."])
    /// Only trust X-Forwarded-For headers from these IPs
    pub trusted_proxies: Vec<String>,
    /// Bootstrap super admin credentials, created at startup when no
    /// active admin exists yet
    pub bootstrap_admin: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        // DATABASE_URL directly, or assembled from individual components.
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| {
                let host = env::var("DB_HOST").map_err(|_| env::VarError::NotPresent)?;
                let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
                let user = env::var("DB_USER").map_err(|_| env::VarError::NotPresent)?;
                let password = env::var("DB_PASSWORD").map_err(|_| env::VarError::NotPresent)?;
                let db = env::var("DB_NAME").map_err(|_| env::VarError::NotPresent)?;
                Ok(format!(
                    "postgres://{}:{}@{}:{}/{}",
                    user, password, host, port, db
                ))
            })
            .map_err(|_: env::VarError| {
                ConfigError::Missing(
                    "DATABASE_URL or DB_HOST + DB_USER + DB_PASSWORD + DB_NAME is required"
                        .to_string(),
                )
            })?;

        let bootstrap_admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(u), Ok(p)) if !u.trim().is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url,
            frontend_dir: env::var("FRONTEND_DIR").unwrap_or_else(|_| "./frontend".to_string()),
            session_expiry_hours: env::var("SESSION_EXPIRY_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(8),
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2 * 1024 * 1024), // 2MB default
            cors_origins: env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["http://localhost:8080".to_string()]),
            environment,
            trusted_proxies: env::var("TRUSTED_PROXIES")
                .map(|s| {
                    s.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            bootstrap_admin,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),
}
