//! Timeout enforcement for upstream calls.
//!
//! # Responsibilities
//! - Bound upstream connection establishment (connector level)
//! - Bound the wait for upstream response headers, counted from the moment
//!   the client body has been fully handed upstream
//! - Leave body streaming unbounded in both directions; uploads may be large
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A connect timeout surfaces as an unreachable upstream (502)
//! - A response-header timeout surfaces as 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use hyper_util::client::legacy::connect::HttpConnector;
use tokio::time::error::Elapsed;

use crate::config::TimeoutConfig;

/// Deadlines applied to every upstream request.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamTimeouts {
    /// TCP connect deadline.
    pub connect: Duration,
    /// Deadline for the upstream to produce response headers.
    pub response_headers: Duration,
    /// Idle lifetime of pooled upstream connections.
    pub idle: Duration,
}

impl UpstreamTimeouts {
    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            response_headers: Duration::from_secs(config.response_header_secs),
            idle: Duration::from_secs(config.idle_secs),
        }
    }

    /// A plain connector carrying the connect deadline.
    ///
    /// `enforce_http` is off so a TLS connector can wrap it for https origins.
    pub fn connector(&self) -> HttpConnector {
        let mut http = HttpConnector::new();
        http.set_connect_timeout(Some(self.connect));
        http.set_nodelay(true);
        http.enforce_http(false);
        http
    }

    /// Await `fut` (an upstream request yielding response headers).
    ///
    /// The response-header deadline is armed only once `upload_done` resolves,
    /// so a slow client upload never counts against it.
    pub async fn await_headers<U, F, T>(&self, upload_done: U, fut: F) -> Result<T, Elapsed>
    where
        U: Future,
        F: Future<Output = T>,
    {
        tokio::pin!(fut);

        tokio::select! {
            biased;
            out = &mut fut => return Ok(out),
            _ = upload_done => {}
        }

        tokio::time::timeout(self.response_headers, fut).await
    }
}
