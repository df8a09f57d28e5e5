use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::cache::CacheConfig;
use crate::matching::{PipelineConfig, ScorerConfig};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("podmatch.db")
}

/// Podcast directory API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Directory API base URL
    #[serde(default = "default_directory_url")]
    pub url: String,
    /// Directory API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_directory_url() -> String {
    "https://listen-api.listennotes.com/api/v2".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Outbound rate limit for the directory API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Maximum admissions inside one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Trailing window length in milliseconds.
    #[serde(default = "default_time_window_ms")]
    pub time_window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            time_window_ms: default_time_window_ms(),
        }
    }
}

fn default_max_requests() -> u32 {
    5
}

fn default_time_window_ms() -> u64 {
    1000
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub directory: SanitizedDirectoryConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub scorer: ScorerConfig,
    pub pipeline: PipelineConfig,
}

/// Sanitized directory config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDirectoryConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            directory: SanitizedDirectoryConfig {
                url: config.directory.url.clone(),
                api_key_configured: !config.directory.api_key.is_empty(),
                timeout_secs: config.directory.timeout_secs,
            },
            rate_limit: config.rate_limit.clone(),
            cache: config.cache.clone(),
            scorer: config.scorer.clone(),
            pipeline: config.pipeline.clone(),
        }
    }
}
