//! Photo Lab PIN gate
//!
//! Guards the photo-editing surface behind a numeric PIN:
//! - First-run PIN creation with confirmation
//! - Verification against a secure credential store
//! - Attempt counting with a time-boxed lockout
//! - A self-expiring countdown that lifts the lockout
//!
//! # Architecture
//!
//! [`PinEntryState`] is a plain value updated by [`PinEntryState::reduce`].
//! [`PinEntry`] owns that state for one open entry surface, runs store calls
//! and the lockout countdown as Tokio tasks, and receives their results as
//! [`EntryEvent`] messages on a channel owned by the host event loop.

pub mod buffer;
pub mod config;
pub mod countdown;
pub mod entry;
pub mod error;
pub mod lockout;
pub mod mode;
pub mod state;
pub mod store;

pub use buffer::{Digit, DigitBuffer};
pub use config::{ConfigError, PinConfig};
pub use countdown::{Countdown, CountdownHandle, Tick};
pub use entry::{EntryEvent, EntryHooks, Phase, PinEntry, PinInput};
pub use error::{EntryError, StoreError};
pub use lockout::LockoutPolicy;
pub use mode::{Mode, Step};
pub use state::{Action, PinEntryState};
pub use store::{CredentialStore, FileStore, MemoryStore};

/// Default number of digits in a PIN
pub const DEFAULT_PIN_LENGTH: usize = 6;

/// Default failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default lockout window in milliseconds
pub const DEFAULT_LOCKOUT_DURATION_MS: u64 = 30_000;

/// Default countdown scheduler period in milliseconds
pub const DEFAULT_COUNTDOWN_TICK_MS: u64 = 100;

/// Key the PIN is stored under in the credential store
pub const SECURE_KEY: &str = "photo_lab_pin";
