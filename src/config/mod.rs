// Configuration module entry point
// Loads layered configuration (defaults, TOML file, environment, CLI) and builds runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    Config, HealthConfig, HttpConfig, LegacyRoute, LoggingConfig, PerformanceConfig,
    ServerConfig, SiteConfig,
};

use crate::logger::Level;
use crate::routing::RoutingPolicy;

/// Values given on the command line, applied over file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub root: Option<String>,
    pub policy: Option<RoutingPolicy>,
}

impl Config {
    /// Load configuration from the given file path (extension optional)
    ///
    /// Layers, later wins: built-in defaults, the file (if present),
    /// `SITE_EDGE__<SECTION>__<KEY>` environment variables, `overrides`.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, overrides, None)
    }

    /// `env` replaces the process environment when set
    fn load_layered(
        config_path: &str,
        overrides: &Overrides,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let policy = overrides.policy.map(|p| match p {
            RoutingPolicy::Rewrite => "rewrite",
            RoutingPolicy::Redirect => "redirect",
        });

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITE_EDGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "site-edge")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB, GET-only edge
            .set_default("http.cache_max_age", 3600)?
            .set_default("site.root", "public")?
            .set_default("site.default_document", "/index.html")?
            .set_default("site.pages_prefix", "/pages")?
            .set_default("site.policy", "redirect")?
            .set_default("site.index_files", vec!["index.html", "index.htm"])?
            .set_default("site.html_fallback", true)?
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("site.root", overrides.root.clone())?
            .set_override_option("site.policy", policy)?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make routing ambiguous or the server unusable
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let invalid = |msg: String| Err(config::ConfigError::Message(msg));

        if Level::parse(&self.logging.level).is_none() {
            return invalid(format!(
                "logging.level must be one of debug, info, warn, error, got '{}'",
                self.logging.level
            ));
        }
        if !self.site.default_document.starts_with('/') || self.site.default_document == "/" {
            return invalid(format!(
                "site.default_document must be an absolute file path, got '{}'",
                self.site.default_document
            ));
        }
        if !self.site.pages_prefix.starts_with('/') {
            return invalid(format!(
                "site.pages_prefix must start with '/', got '{}'",
                self.site.pages_prefix
            ));
        }
        let prefix = self.site.pages_prefix.trim_matches('/');
        if prefix.is_empty() || prefix.contains('/') {
            return invalid(format!(
                "site.pages_prefix must be a single directory like '/pages', got '{}'",
                self.site.pages_prefix
            ));
        }
        if self.site.index_files.is_empty() {
            return invalid("site.index_files must not be empty".to_string());
        }
        for route in &self.site.legacy_routes {
            if !route.from.starts_with('/') || !route.to.starts_with('/') {
                return invalid(format!(
                    "legacy route '{}' -> '{}' must use absolute paths",
                    route.from, route.to
                ));
            }
        }
        if self.server.workers == Some(0) {
            return invalid("server.workers must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
