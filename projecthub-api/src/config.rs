/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `ENABLE_HSTS`: Send `Strict-Transport-Security` (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUN_MIGRATIONS`: Apply pending migrations at startup (default: true)
/// - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
/// - `UPLOAD_DIR`: Directory for uploaded files (default: ./uploads)
/// - `MAX_UPLOAD_BYTES`: Largest accepted request body (default: 10 MiB)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter (default: projecthub_api=debug,projecthub_shared=info,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use projecthub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default request body cap (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Minimum accepted JWT secret length
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Uploaded file storage
    pub storage: StorageConfig,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Whether to send HSTS (only behind HTTPS)
    pub enable_hsts: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Uploaded file storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the local blob store
    pub upload_dir: PathBuf,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field lines
    #[default]
    Pretty,

    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown log format '{}' (expected 'pretty' or 'json')", other),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LEN);
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 8080)?,
                cors_origins,
                enable_hsts: parse_or(&lookup, "ENABLE_HSTS", false)?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            },
            jwt: JwtConfig { secret: jwt_secret },
            storage: StorageConfig {
                upload_dir: lookup("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./uploads")),
                max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

/// Parses `key` if set, otherwise returns `default`
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)])
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(config.cors_allows_any());
        assert!(!config.api.enable_hsts);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert_eq!(config.storage.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(config.storage.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://db/app"),
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("RUN_MIGRATIONS", "false"),
            ("UPLOAD_DIR", "/var/lib/projecthub"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.cors_allows_any());
        assert!(!config.database.run_migrations);
        assert_eq!(config.storage.upload_dir, PathBuf::from("/var/lib/projecthub"));
        assert_eq!(config.storage.max_upload_bytes, 1024);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_required() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
    }

    #[test]
    fn test_short_jwt_secret() {
        let err = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", "short")])
            .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)])
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
    }
}
