use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub content_store: ContentStoreConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Limits and rate policy for the repository importer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub max_repo_size_mb: u64,
    pub rate_limit_per_window: u32,
    pub rate_window_seconds: u64,
    pub rate_sweep_seconds: u64,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./data/repodrop.db".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let external_url = std::env::var("EXTERNAL_URL").ok();

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MAX_CONNECTIONS value".to_string()))?;

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MIN_CONNECTIONS value".to_string()))?;

        let connection_timeout_seconds = std::env::var("DATABASE_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_CONNECTION_TIMEOUT value".to_string()))?;

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_IDLE_TIMEOUT value".to_string()))?;

        let content_store_url = std::env::var("CONTENT_STORE_URL")
            .unwrap_or_else(|_| "https://store.repodrop.dev".to_string());

        let content_store_api_key = std::env::var("CONTENT_STORE_API_KEY").ok();

        let max_repo_size_mb = std::env::var("MAX_REPO_SIZE_MB")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REPO_SIZE_MB value".to_string()))?;

        let rate_limit_per_window = std::env::var("IMPORT_RATE_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid IMPORT_RATE_LIMIT value".to_string()))?;

        let rate_window_seconds = std::env::var("IMPORT_RATE_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid IMPORT_RATE_WINDOW_SECS value".to_string()))?;

        let rate_sweep_seconds = std::env::var("IMPORT_RATE_SWEEP_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid IMPORT_RATE_SWEEP_SECS value".to_string()))?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                external_url,
                max_request_body_size,
            },
            content_store: ContentStoreConfig {
                base_url: content_store_url,
                api_key: content_store_api_key,
            },
            import: ImportConfig {
                max_repo_size_mb,
                rate_limit_per_window,
                rate_window_seconds,
                rate_sweep_seconds,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.import.max_repo_size_mb == 0 {
            return Err(Error::Config(
                "Max repository size must be non-zero".to_string(),
            ));
        }

        if self.import.rate_limit_per_window == 0 || self.import.rate_window_seconds == 0 {
            return Err(Error::Config(
                "Import rate limit and window must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL under which containers are reachable
    pub fn public_base_url(&self) -> String {
        self.server
            .external_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }
}
