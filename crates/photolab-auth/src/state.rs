//! Entry surface state and its transition function
//!
//! [`PinEntryState`] is only ever changed through [`PinEntryState::reduce`],
//! which consumes the current snapshot and returns the next one.

use tokio::time::Instant;

use crate::buffer::{Digit, DigitBuffer};
use crate::error::EntryError;
use crate::lockout::LockoutPolicy;

/// Input to the state transition function
#[derive(Clone, Debug)]
pub enum Action {
    /// Reset to a fresh surface: empty digits, no attempts, unlocked, no error
    Initialize,
    /// Fill the first empty slot
    AddDigit(Digit),
    /// Empty the last filled slot
    RemoveDigit,
    /// Empty every slot
    ClearDigits,
    /// Record a failed check and lock if the policy says so
    IncrementAttempts { policy: LockoutPolicy, now: Instant },
    /// Lift an active lockout, keeping the attempt count
    ResetLockout,
    /// Replace the current error
    SetError(Option<EntryError>),
}

/// State of one open PIN entry surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinEntryState {
    digits: DigitBuffer,
    attempts: u32,
    lockout_end_time: Option<Instant>,
    error: Option<EntryError>,
}

impl PinEntryState {
    /// Fresh state with `pin_length` empty slots
    pub fn new(pin_length: usize) -> Self {
        Self {
            digits: DigitBuffer::new(pin_length),
            attempts: 0,
            lockout_end_time: None,
            error: None,
        }
    }

    /// Apply one action
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Initialize => return Self::new(self.digits.len()),
            Action::AddDigit(digit) => {
                if self.digits.push(digit) {
                    self.error = None;
                }
            }
            Action::RemoveDigit => {
                if self.digits.pop() {
                    self.error = None;
                }
            }
            Action::ClearDigits => {
                self.digits.clear();
                self.error = None;
            }
            Action::IncrementAttempts { policy, now } => {
                self.attempts = self.attempts.saturating_add(1);
                self.digits.clear();
                if policy.should_lock(self.attempts) {
                    self.lockout_end_time = Some(now + policy.lockout_duration);
                    self.error = Some(EntryError::TooManyAttempts {
                        lockout: policy.lockout_duration,
                    });
                } else {
                    self.error = Some(EntryError::IncorrectPin {
                        remaining: policy.attempts_remaining(self.attempts),
                    });
                }
            }
            Action::ResetLockout => {
                self.lockout_end_time = None;
                self.error = None;
            }
            Action::SetError(error) => {
                self.error = error;
            }
        }
        self
    }

    /// Current digit slots
    pub fn digits(&self) -> &DigitBuffer {
        &self.digits
    }

    /// Consecutive failed checks since the surface was initialized
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether a lockout window is active
    pub fn is_locked(&self) -> bool {
        self.lockout_end_time.is_some()
    }

    /// Whether the active lockout window has run out by `now`
    pub fn lockout_elapsed(&self, now: Instant) -> bool {
        self.lockout_end_time.is_some_and(|end| now >= end)
    }

    /// When the active lockout ends
    pub fn lockout_end_time(&self) -> Option<Instant> {
        self.lockout_end_time
    }

    /// Most recent failure shown to the user
    pub fn error(&self) -> Option<&EntryError> {
        self.error.as_ref()
    }
}
