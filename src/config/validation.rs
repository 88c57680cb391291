//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges (timeouts > 0, delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use url::Url;

use crate::config::schema::RelayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_http_url(&mut errors, "rpc.primary_url", &config.primary_rpc_url());
    for (i, url) in config.rpc.fallback_urls.iter().enumerate() {
        check_http_url(&mut errors, &format!("rpc.fallback_urls[{}]", i), url);
    }
    if config.rpc.request_timeout_ms == 0 {
        errors.push(ValidationError::new("rpc.request_timeout_ms", "must be greater than 0"));
    }

    check_http_url(&mut errors, "explorer.base_url", &config.explorer.base_url);

    let confirmation = &config.confirmation;
    if confirmation.timeout_ms == 0 {
        errors.push(ValidationError::new("confirmation.timeout_ms", "must be greater than 0"));
    }
    if confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    } else if confirmation.poll_interval_ms > confirmation.timeout_ms {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            format!(
                "{} exceeds confirmation.timeout_ms ({})",
                confirmation.poll_interval_ms, confirmation.timeout_ms
            ),
        ));
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if retries.base_delay_ms == 0 {
        errors.push(ValidationError::new("retries.base_delay_ms", "must be greater than 0"));
    }
    if retries.max_delay_ms < retries.base_delay_ms {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            format!("must be >= retries.base_delay_ms ({})", retries.base_delay_ms),
        ));
    }
    if retries.attempt_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "retries.attempt_timeout_ms",
            "must be greater than 0",
        ));
    }
    if retries.total_timeout_ms == 0 {
        errors.push(ValidationError::new("retries.total_timeout_ms", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!(
                "'{}' is not one of {}",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}
