//! HTTP server settings, read from the environment at startup.

use std::str::FromStr;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin
    pub cors_origins: Vec<String>,
    /// Request bodies above this are rejected with 413
    pub max_body_size: usize,
    /// `production` hides internal error details from responses
    pub environment: String,
    /// Serve `/metrics` and record request metrics
    pub metrics_enabled: bool,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            max_body_size: DEFAULT_MAX_BODY_BYTES,
            environment: "development".to_string(),
            metrics_enabled: true,
            json_logs: false,
        }
    }
}

/// Parsed value of `key`, or `None` when unset or unparsable.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

/// Any value other than `0`, `false`, `no` or `off` switches the flag on.
fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|raw| {
        !matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        )
    })
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

impl ApiConfig {
    /// `API_HOST`, `API_PORT`, `CORS_ORIGINS`, `MAX_BODY_SIZE`, `ENVIRONMENT`,
    /// `METRICS_ENABLED` and `LOG_FORMAT=json`; unset keys keep their defaults.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            host: env_parse("API_HOST").unwrap_or(base.host),
            port: env_parse("API_PORT").unwrap_or(base.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(base.cors_origins),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(base.max_body_size),
            environment: env_parse("ENVIRONMENT").unwrap_or(base.environment),
            metrics_enabled: env_flag("METRICS_ENABLED").unwrap_or(base.metrics_enabled),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(base.json_logs),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
