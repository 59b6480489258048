//! Brute-force protection through a time-boxed lockout
//!
//! Every failed check counts toward `max_attempts`. Reaching it locks the
//! entry surface for `lockout_duration`. Attempts are not forgiven when the
//! lockout expires, only when the surface is re-initialized.

use std::time::Duration;

use crate::{DEFAULT_LOCKOUT_DURATION_MS, DEFAULT_MAX_ATTEMPTS};

/// Lockout policy for failed PIN attempts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failed attempts that trigger a lockout
    pub max_attempts: u32,
    /// How long a lockout lasts
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_duration: Duration::from_millis(DEFAULT_LOCKOUT_DURATION_MS),
        }
    }
}

impl LockoutPolicy {
    /// Create a custom policy
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_attempts,
            lockout_duration,
        }
    }

    /// Whether `attempts` failures should lock the surface
    pub fn should_lock(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    /// Attempts left before the next lockout
    pub fn attempts_remaining(&self, attempts: u32) -> u32 {
        self.max_attempts.saturating_sub(attempts)
    }
}
