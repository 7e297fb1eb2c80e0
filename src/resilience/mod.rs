//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (connect deadline on the connector)
//!     → timeouts.rs (response-header deadline around the call)
//!     → body streams with no deadline
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline up to the first response byte
//! - No retries: forwarded bodies are streamed once and cannot be replayed

pub mod timeouts;

pub use timeouts::UpstreamTimeouts;
