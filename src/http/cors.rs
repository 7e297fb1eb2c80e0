//! CORS normalization.
//!
//! Every response leaving the proxy, forwarded or local, gets the configured
//! `Access-Control-Allow-*` values, overriding whatever the upstream sent.
//! Preflights are answered here and never reach the upstream.

use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CorsConfig, ValidationError};

/// Header values resolved once from [`CorsConfig`].
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: Option<HeaderValue>,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ValidationError> {
        let value = |name: &'static str, raw: String| {
            HeaderValue::from_str(&raw).map_err(|_| ValidationError::CorsHeader(name, raw))
        };

        Ok(Self {
            allow_origin: value("allowed_origin", config.allowed_origin.clone())?,
            allow_methods: value("allowed_methods", config.allowed_methods.join(", "))?,
            allow_headers: value("allowed_headers", config.allowed_headers.join(", "))?,
            max_age: config.max_age_secs.map(HeaderValue::from),
        })
    }

    /// Wrap `router` so every response carries the allow headers.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                self.allow_origin.clone(),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_METHODS,
                self.allow_methods.clone(),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_HEADERS,
                self.allow_headers.clone(),
            ))
    }

    /// 204 answer to an `OPTIONS` preflight. Allow headers come from [`apply`](Self::apply).
    pub fn preflight_response(&self) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if let Some(max_age) = &self.max_age {
            response
                .headers_mut()
                .insert(ACCESS_CONTROL_MAX_AGE, max_age.clone());
        }
        response
    }
}
