use std::env;

use thiserror::Error;

/// Default backend location used outside production.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8585/api";

/// AppConfig
///
/// Holds the frontend's entire configuration state. Loaded once at startup and
/// cloned into the application state, where handlers pull it through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the CMS backend API. Every public-content and auth request is built on it.
    pub api_base_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Directory holding the Tera templates (`**/*.html`).
    pub templates_dir: String,
    // Inactivity window after which a login session is dropped.
    pub session_ttl_minutes: i64,
    // Optional shared secret used to verify backend-issued session tokens.
    pub jwt_secret: Option<String>,
    // Runtime environment marker. Controls log format and cookie hardening.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context: local development or hardened production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Raised by [`AppConfig::load`] when the environment cannot produce a usable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl Default for AppConfig {
    /// Safe local values, primarily for test state scaffolding.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            templates_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string(),
            session_ttl_minutes: 120,
            jwt_secret: None,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Production refuses to start
    /// without an explicit `API_BASE_URL`; local runs fall back to the development backend.
    pub fn load() -> Result<Self, ConfigError> {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").map_err(|_| ConfigError::Missing("API_BASE_URL"))?
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            }
        };

        let session_ttl_minutes = match env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => parse_ttl(&raw)?,
            Err(_) => 120,
        };

        Ok(Self {
            api_base_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            templates_dir: env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string()),
            session_ttl_minutes,
            // An empty secret is treated as "not configured".
            jwt_secret: env::var("AUTH_JWT_SECRET").ok().filter(|s| !s.is_empty()),
            env,
        })
    }
}

fn parse_ttl(raw: &str) -> Result<i64, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "SESSION_TTL_MINUTES",
        reason,
    };
    let minutes: i64 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if minutes <= 0 {
        return Err(invalid("must be a positive number of minutes".to_string()));
    }
    Ok(minutes)
}
