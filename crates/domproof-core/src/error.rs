//! Error types for the verification harness

use thiserror::Error;

/// Failure kinds a scenario step can surface.
///
/// Assertion mismatches are deliberately absent: they are recorded as data on
/// the scenario result, never raised as errors.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("timed out waiting for {condition} (last seen: {last_seen})")]
    Timeout { condition: String, last_seen: String },

    #[error("element {selector} not interactable: {reason}")]
    NotInteractable { selector: String, reason: String },

    #[error("no element matched {selector}")]
    ElementNotFound { selector: String },

    #[error("browser transport error: {0}")]
    Transport(String),

    #[error("session teardown failed: {0}")]
    Teardown(String),

    #[error("evidence I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
