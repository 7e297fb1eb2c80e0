//! Proxy error taxonomy and its mapping to client responses.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Per-request failures. None of these terminate the listener.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connect failure, DNS failure, or reset before response headers.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] hyper_util::client::legacy::Error),

    /// No response headers within the configured bound.
    #[error("upstream sent no response headers within {0:?}")]
    UpstreamTimeout(Duration),

    /// The client went away while its body was being streamed upstream.
    #[error("client disconnected mid-request")]
    ClientDisconnect,

    /// Path outside the public prefix and not `/health`.
    #[error("no route for {0}")]
    RouteNotFound(String),

    /// The rewritten target could not be parsed as a URI.
    #[error("invalid upstream uri `{0}`")]
    InvalidUpstreamUri(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            // Nobody is left to read this.
            ProxyError::ClientDisconnect => StatusCode::BAD_REQUEST,
            ProxyError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::InvalidUpstreamUri(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::UpstreamUnreachable(_) => "upstream_unreachable",
            ProxyError::UpstreamTimeout(_) => "upstream_timeout",
            ProxyError::ClientDisconnect => "client_disconnect",
            ProxyError::RouteNotFound(_) => "not_found",
            ProxyError::InvalidUpstreamUri(_) => "invalid_uri",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match self {
            ProxyError::UpstreamUnreachable(_) => "Upstream request failed",
            ProxyError::UpstreamTimeout(_) => "Upstream timed out",
            ProxyError::ClientDisconnect => "Client disconnected",
            ProxyError::RouteNotFound(_) => "Not found",
            ProxyError::InvalidUpstreamUri(_) => "Invalid request path",
        };

        (self.status(), body).into_response()
    }
}
