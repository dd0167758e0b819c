// Configuration types module
// Defines all configuration-related data structures

use crate::routing::{RouteTable, RoutingPolicy};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Runtime worker threads (CPU count when unset)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// One of `debug`, `info`, `warn`, `error`
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration (all durations in seconds)
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    /// Grace period for in-flight connections after a shutdown signal
    pub shutdown_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
    /// `max-age` for successfully served assets
    pub cache_max_age: u32,
}

/// Site layout and routing configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Directory holding the built site
    pub root: String,
    /// Fallback asset path, served for `/` and for anything missing
    pub default_document: String,
    /// Directory the redirect policy canonicalizes into
    pub pages_prefix: String,
    pub policy: RoutingPolicy,
    /// Files tried when a path names a directory
    pub index_files: Vec<String>,
    /// Serve `<path>.html` for extensionless paths with no exact file
    pub html_fallback: bool,
    /// Fixed legacy → canonical rewrites
    #[serde(default)]
    pub legacy_routes: Vec<LegacyRoute>,
}

/// One legacy route table entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LegacyRoute {
    pub from: String,
    pub to: String,
}

impl SiteConfig {
    pub fn route_table(&self) -> RouteTable {
        RouteTable::from_entries(
            self.legacy_routes
                .iter()
                .map(|route| (route.from.as_str(), route.to.clone())),
        )
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness check path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness check path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}
