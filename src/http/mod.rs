//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, CORS layers)
//!     → routing (health / preflight / forward / not found)
//!     → proxy.rs (rewrite, stream to upstream, stream back)
//!     → headers.rs (hop-by-hop, X-Forwarded-*)
//!     → cors.rs (allow headers on every response)
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod headers;
pub mod proxy;
pub mod request;
pub mod server;

pub use error::ProxyError;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
