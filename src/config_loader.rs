use crate::errors::{ServiceError, ServiceResult};
use crate::scoring::ScoringWeights;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "skadix.toml";
pub const ENV_PREFIX: &str = "SKADIX_";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub service_name: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub model: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Cross-origin policy.
///
/// Defaults to `["*"]`: any origin, and methods and headers are never
/// restricted. No access control is performed by the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allow_origins: default_allow_origins(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|o| o.trim() == "*")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            service_name: "SkadiX API".to_string(),
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            log: LogConfig::default(),
            model: ScoringWeights::default(),
        }
    }
}

/// Layered configuration: defaults, then TOML file, then `SKADIX_*` env.
///
/// With no `path`, `skadix.toml` in the working directory is read if it
/// exists. An explicit `path` must exist.
pub fn figment(path: Option<&Path>) -> ServiceResult<Figment> {
    let file = match path {
        Some(p) if !p.exists() => {
            return Err(ServiceError::config(format!(
                "config file not found: {}",
                p.display()
            )));
        }
        Some(p) => Toml::file(p),
        None => Toml::file(DEFAULT_CONFIG_FILE),
    };

    Ok(Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(file)
        .merge(Env::prefixed(ENV_PREFIX).split("__")))
}

pub fn load_config(path: Option<&Path>) -> ServiceResult<AppConfig> {
    let config: AppConfig = figment(path)?.extract()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> ServiceResult<()> {
    if config.service_name.trim().is_empty() {
        return Err(ServiceError::config("service_name must not be empty"));
    }

    if config.model.precision > 15 {
        return Err(ServiceError::config(format!(
            "model.precision must be at most 15, got {}",
            config.model.precision
        )));
    }

    for origin in &config.cors.allow_origins {
        if origin.trim() != "*" && axum::http::HeaderValue::from_str(origin).is_err() {
            return Err(ServiceError::config(format!(
                "cors.allow_origins contains an invalid origin: {origin:?}"
            )));
        }
    }

    Ok(())
}
