//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Every problem is collected so
//! an operator sees the full list in one startup attempt.

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.origin `{0}` is not an absolute URL: {1}")]
    OriginNotUrl(String, String),

    #[error("upstream.origin `{0}` must use http or https")]
    OriginScheme(String),

    #[error("upstream.origin `{0}` must have a host")]
    OriginHost(String),

    #[error("upstream.origin `{0}` must not carry a query or fragment")]
    OriginExtras(String),

    #[error("upstream.public_prefix `{0}` must start with '/', not end with '/', and not be '/'")]
    PrefixShape(String),

    #[error("upstream.public_prefix must not shadow /health")]
    PrefixShadowsHealth,

    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.connect_secs ({connect}) must not exceed timeouts.response_header_secs ({response})")]
    ConnectExceedsResponse { connect: u64, response: u64 },

    #[error("cors.{0} `{1}` is not a valid header value")]
    CorsHeader(&'static str, String),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_origin(&config.upstream.origin, &mut errors);

    let prefix = config.upstream.public_prefix.as_str();
    if !prefix.starts_with('/') || prefix.ends_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::PrefixShape(prefix.to_string()));
    } else if prefix == "/health" {
        errors.push(ValidationError::PrefixShadowsHealth);
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("connect_secs", timeouts.connect_secs),
        ("response_header_secs", timeouts.response_header_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }
    // Otherwise a slow connect would be reported as 504 instead of 502.
    if timeouts.connect_secs > timeouts.response_header_secs {
        errors.push(ValidationError::ConnectExceedsResponse {
            connect: timeouts.connect_secs,
            response: timeouts.response_header_secs,
        });
    }

    let cors = &config.cors;
    let joined_methods = cors.allowed_methods.join(", ");
    let joined_headers = cors.allowed_headers.join(", ");
    for (name, value) in [
        ("allowed_origin", cors.allowed_origin.as_str()),
        ("allowed_methods", joined_methods.as_str()),
        ("allowed_headers", joined_headers.as_str()),
    ] {
        if value.is_empty() || HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::CorsHeader(name, value.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_origin(origin: &str, errors: &mut Vec<ValidationError>) {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            errors.push(ValidationError::OriginNotUrl(origin.to_string(), e.to_string()));
            return;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        errors.push(ValidationError::OriginScheme(origin.to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        errors.push(ValidationError::OriginHost(origin.to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        errors.push(ValidationError::OriginExtras(origin.to_string()));
    }
}
