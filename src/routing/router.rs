//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Classify each request: liveness, preflight, forward, or no match
//! - Compute the upstream path and query for forwarded requests
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Explicit NotFound rather than silent default

use axum::http::{Method, Uri};

use crate::config::UpstreamConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// Path of the liveness endpoint. Never forwarded.
pub const HEALTH_PATH: &str = "/health";

/// Outcome of routing a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// `GET /health`.
    Health,
    /// `OPTIONS` under the prefix; answered locally.
    Preflight,
    /// Forward upstream to this absolute URL.
    Forward(String),
    /// Outside the prefix.
    NotFound,
}

/// Compiled routing table for the single upstream.
#[derive(Debug, Clone)]
pub struct Router {
    prefix: PathPrefixMatcher,
    origin_base: String,
}

impl Router {
    /// Build the router from the upstream section of the config.
    pub fn from_config(upstream: &UpstreamConfig) -> Self {
        Self {
            prefix: PathPrefixMatcher::new(upstream.public_prefix.clone()),
            origin_base: upstream.origin_base().to_string(),
        }
    }

    /// Classify a request by method and URI.
    pub fn match_request(&self, method: &Method, uri: &Uri) -> RouteMatch {
        let path = uri.path();

        if path == HEALTH_PATH && (method == Method::GET || method == Method::HEAD) {
            return RouteMatch::Health;
        }

        let Some(rest) = self.prefix.strip(path) else {
            return RouteMatch::NotFound;
        };

        if method == Method::OPTIONS {
            return RouteMatch::Preflight;
        }

        RouteMatch::Forward(self.upstream_url(rest, uri.query()))
    }

    /// `origin + rest + ?query`. An empty `rest` targets the upstream root.
    fn upstream_url(&self, rest: &str, query: Option<&str>) -> String {
        let mut url = String::with_capacity(self.origin_base.len() + rest.len() + 16);
        url.push_str(&self.origin_base);
        if rest.is_empty() {
            url.push('/');
        } else {
            url.push_str(rest);
        }
        if let Some(q) = query {
            url.push('?');
            url.push_str(q);
        }
        url
    }

    /// The public prefix requests are matched against.
    pub fn prefix(&self) -> &str {
        self.prefix.prefix()
    }
}
