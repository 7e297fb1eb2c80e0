//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch handler / forwarder
//!     → logging.rs (structured events, request_id in every span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
