//! Operator-facing diagnostics: explorer links and error classification.

pub mod classify;
pub mod explorer;

pub use classify::{classify, extract_simulation_error, log_report, retry_hint, ErrorKind, ErrorReport};
pub use explorer::Explorer;
