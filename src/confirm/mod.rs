//! Transaction confirmation.
//!
//! # Data Flow
//! ```text
//! Signature
//!     → status.rs (one getSignatureStatuses read → StatusCheck)
//!     → poll.rs (bounded poll loop, canonical)
//!     → backoff.rs (attempts racing the node client's own wait)
//!     → ConfirmResult
//! ```
//!
//! # Design Decisions
//! - Only definite success or a `ConfirmError` ever reaches the caller
//! - On-chain failures are terminal and never retried
//! - Read-path errors are downgraded to "not found" and polling continues
//! - A timeout never claims the transaction failed

pub mod backoff;
pub mod outcome;
pub mod poll;
pub mod simulate;
pub mod status;

pub use backoff::calculate_backoff;
pub use outcome::{ConfirmError, ConfirmResult, ConfirmationReport, StatusCheck};
pub use poll::Confirmer;
pub use simulate::{simulate_transaction, SimulationOutcome, DEFAULT_LOG_TAIL};
pub use status::{check_status, check_status_with_fallback};
