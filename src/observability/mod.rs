//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! request loggers → TracingSink → subscriber (logging.rs) → stdout
//! logging core + middleware → metrics.rs → Prometheus scrape
//! ```

pub mod logging;
pub mod metrics;
