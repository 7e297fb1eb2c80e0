//! Upload forwarding proxy.
//!
//! Accepts browser uploads under a public prefix, strips the prefix, streams
//! them to a single remote storage origin, and relays the response with
//! permissive CORS headers.
//!
//! ```text
//!   Client ──▶ http::server ──▶ routing ──▶ http::proxy ──▶ Upstream
//!   Client ◀── CORS layers  ◀──────────────  (streamed) ◀── Upstream
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
