//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LogFormat, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: `{value}`")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the startup configuration: defaults, then the optional file,
/// then `PROXY_*` environment variables, then validation.
pub fn resolve(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts the environment so tests need not mutate process state.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PROXY_BIND_HOST") {
        config.listener.bind_host = v;
    }
    if let Some(v) = get("PROXY_LISTEN_PORT") {
        config.listener.port = parse("PROXY_LISTEN_PORT", &v)?;
    }
    if let Some(v) = get("PROXY_UPSTREAM_ORIGIN") {
        config.upstream.origin = v;
    }
    if let Some(v) = get("PROXY_PUBLIC_PREFIX") {
        config.upstream.public_prefix = v;
    }
    if let Some(v) = get("PROXY_CORS_ALLOWED_ORIGIN") {
        config.cors.allowed_origin = v;
    }
    if let Some(v) = get("PROXY_CORS_ALLOWED_METHODS") {
        config.cors.allowed_methods = split_list(&v);
    }
    if let Some(v) = get("PROXY_CORS_ALLOWED_HEADERS") {
        config.cors.allowed_headers = split_list(&v);
    }
    if let Some(v) = get("PROXY_CORS_MAX_AGE_SECS") {
        config.cors.max_age_secs = Some(parse("PROXY_CORS_MAX_AGE_SECS", &v)?);
    }
    if let Some(v) = get("PROXY_CONNECT_TIMEOUT_SECS") {
        config.timeouts.connect_secs = parse("PROXY_CONNECT_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = get("PROXY_RESPONSE_TIMEOUT_SECS") {
        config.timeouts.response_header_secs = parse("PROXY_RESPONSE_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = get("PROXY_SHUTDOWN_GRACE_SECS") {
        config.timeouts.shutdown_grace_secs = parse("PROXY_SHUTDOWN_GRACE_SECS", &v)?;
    }
    if let Some(v) = get("PROXY_LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = get("PROXY_LOG_FORMAT") {
        config.observability.log_format = match v.trim().to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => return Err(ConfigError::Env { key: "PROXY_LOG_FORMAT", value: v }),
        };
    }

    Ok(())
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
