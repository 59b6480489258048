//! Error types for the PIN gate

use std::time::Duration;

use thiserror::Error;

/// User-facing failure shown on the entry surface
///
/// The `Display` output is the exact message rendered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Check failed but attempts remain
    #[error("Incorrect PIN. {remaining} attempts remaining.")]
    IncorrectPin { remaining: u32 },

    /// Check failed and the lockout threshold was reached
    #[error("Too many attempts. Try again in {} seconds.", format_seconds(.lockout))]
    TooManyAttempts { lockout: Duration },

    /// Confirmation did not match the newly created PIN
    #[error("PINs do not match. Please try again.")]
    PinMismatch,

    /// The credential store failed
    #[error("An error occurred. Please try again.")]
    Unexpected,
}

/// Credential store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Whole seconds print without a fractional part, sub-second windows keep it
fn format_seconds(duration: &Duration) -> String {
    format!("{}", duration.as_secs_f64())
}
