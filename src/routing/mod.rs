//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → router.rs (classify)
//!     → matcher.rs (public prefix, segment aware)
//!     → Return: Health | Preflight | Forward(url) | NotFound
//! ```
//!
//! # Design Decisions
//! - Compiled once at startup, immutable at runtime
//! - Deterministic: same input always yields the same decision

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, Router, HEALTH_PATH};
