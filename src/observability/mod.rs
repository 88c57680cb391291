//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! rpc / confirm / tx / accounts produce:
//!     → logging.rs (structured log events, per-wait session spans)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`signature`, `attempt`, `elapsed_ms`, `explorer_url`)
//! - Every confirmation runs inside a span carrying a session UUID

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
