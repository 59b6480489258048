//! PIN entry surface controller
//!
//! [`PinEntry`] owns the state of one entry surface from `open` to `close`.
//! Store calls and the lockout countdown run as Tokio tasks; their results
//! come back as [`EntryEvent`]s on the channel handed to [`PinEntry::new`],
//! and the host feeds them to [`PinEntry::handle_event`] from its event loop.
//!
//! Every event is stamped with the generation of the surface that issued it.
//! Closing or reopening bumps the generation, so a result that resolves after
//! the surface went away is dropped instead of applied.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::buffer::Digit;
use crate::config::PinConfig;
use crate::countdown::{ceil_seconds, CountdownHandle, Tick};
use crate::error::{EntryError, StoreError};
use crate::lockout::LockoutPolicy;
use crate::mode::{Mode, Step};
use crate::state::{Action, PinEntryState};
use crate::store::CredentialStore;

/// Callbacks from the entry surface to its host
pub trait EntryHooks {
    /// A PIN was verified, or a new PIN was confirmed and stored
    fn on_matches(&mut self, pin: &str);

    /// The buffer just became full while input was accepted
    fn on_pin_complete(&mut self, _pin: &str) {}

    /// A check failed; hosts typically shake the PIN slots
    fn on_invalid_pin(&mut self) {}
}

/// Processing phase of the surface, independent of lockout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not shown; all input and events are ignored
    Closed,
    /// Waiting for the credential existence probe
    Probing,
    /// Accepting input
    Ready,
    /// Waiting for the stored credential to be read and compared
    Verifying,
    /// Waiting for a new credential to be written
    Persisting,
}

impl Phase {
    /// Whether key input is processed in this phase
    pub fn accepts_input(self) -> bool {
        self == Phase::Ready
    }
}

/// Key input from the PIN pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinInput {
    Digit(Digit),
    Backspace,
    Clear,
    Submit,
}

/// Result of background work, to be passed back to [`PinEntry::handle_event`]
pub struct EntryEvent {
    generation: u64,
    kind: EventKind,
}

enum EventKind {
    Probed(Result<bool, StoreError>),
    Verified {
        pin: Zeroizing<String>,
        result: Result<bool, StoreError>,
    },
    Persisted {
        pin: Zeroizing<String>,
        result: Result<(), StoreError>,
    },
    Countdown {
        deadline: Instant,
        tick: Tick,
    },
}

impl EventKind {
    fn name(&self) -> &'static str {
        match self {
            EventKind::Probed(_) => "probe",
            EventKind::Verified { .. } => "verify",
            EventKind::Persisted { .. } => "persist",
            EventKind::Countdown { .. } => "countdown",
        }
    }
}

impl fmt::Debug for EntryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryEvent")
            .field("generation", &self.generation)
            .field("kind", &self.kind.name())
            .finish()
    }
}

/// Controller for one PIN entry surface
pub struct PinEntry {
    config: PinConfig,
    policy: LockoutPolicy,
    store: Arc<dyn CredentialStore>,
    hooks: Box<dyn EntryHooks>,
    events: mpsc::UnboundedSender<EntryEvent>,
    state: PinEntryState,
    mode: Mode,
    phase: Phase,
    generation: u64,
    /// The only countdown allowed to run for this surface
    countdown: Option<CountdownHandle>,
    seconds_remaining: u64,
}

impl PinEntry {
    /// Create a closed entry surface
    ///
    /// Background results are sent on `events`; the host must route them to
    /// [`PinEntry::handle_event`].
    pub fn new(
        config: PinConfig,
        store: Arc<dyn CredentialStore>,
        hooks: Box<dyn EntryHooks>,
        events: mpsc::UnboundedSender<EntryEvent>,
    ) -> Self {
        let policy = config.lockout_policy();
        let state = PinEntryState::new(config.pin_length);
        Self {
            config,
            policy,
            store,
            hooks,
            events,
            state,
            mode: Mode::default(),
            phase: Phase::Closed,
            generation: 0,
            countdown: None,
            seconds_remaining: 0,
        }
    }

    /// Show the surface: reset all state and probe the store for a PIN
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(&mut self) {
        self.reset();
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Probing;
        info!("PIN entry opened");

        let store = Arc::clone(&self.store);
        let key = self.config.store_key.clone();
        let events = self.events.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = store.exists(&key).await;
            let _ = events.send(EntryEvent {
                generation,
                kind: EventKind::Probed(result),
            });
        });
    }

    /// Hide the surface, cancelling the countdown and orphaning in-flight work
    pub fn close(&mut self) {
        if self.phase == Phase::Closed {
            return;
        }
        self.reset();
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Closed;
        info!("PIN entry closed");
    }

    /// Process one key press
    pub fn handle_input(&mut self, input: PinInput) {
        self.expire_lockout_if_due(Instant::now());

        if self.is_blocked() {
            debug!(
                phase = ?self.phase,
                locked = self.state.is_locked(),
                "Ignoring PIN input"
            );
            return;
        }

        match input {
            PinInput::Digit(digit) => {
                let was_complete = self.state.digits().is_complete();
                self.dispatch(Action::AddDigit(digit));

                if !was_complete && self.state.digits().is_complete() {
                    let pin = self.state.digits().pin();
                    self.hooks.on_pin_complete(&pin);
                    if self.config.auto_submit {
                        self.submit();
                    }
                }
            }
            PinInput::Backspace => self.dispatch(Action::RemoveDigit),
            PinInput::Clear => self.dispatch(Action::ClearDigits),
            PinInput::Submit => self.submit(),
        }
    }

    /// Apply the result of background work
    pub fn handle_event(&mut self, event: EntryEvent) {
        if event.generation != self.generation || self.phase == Phase::Closed {
            debug!("Discarding stale {} event", event.kind.name());
            return;
        }

        match event.kind {
            EventKind::Probed(result) => self.on_probed(result),
            EventKind::Verified { pin, result } => self.on_verified(pin, result),
            EventKind::Persisted { pin, result } => self.on_persisted(pin, result),
            EventKind::Countdown { deadline, tick } => self.on_countdown(deadline, tick),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> &PinEntryState {
        &self.state
    }

    /// Current mode
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Current processing phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Configuration in use
    pub fn config(&self) -> &PinConfig {
        &self.config
    }

    /// Whether the surface is shown
    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    /// Whether key input is currently ignored
    pub fn is_blocked(&self) -> bool {
        !self.phase.accepts_input() || self.state.is_locked()
    }

    /// Whole seconds left in the active lockout, 0 when unlocked
    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    /// Failed checks left before the next lockout
    pub fn attempts_remaining(&self) -> u32 {
        self.policy.attempts_remaining(self.state.attempts())
    }

    /// Instruction for the current mode
    pub fn prompt(&self) -> String {
        self.mode.prompt(self.config.pin_length)
    }

    /// Submit label for the current mode and buffer
    pub fn action_label(&self) -> &'static str {
        self.mode.action_label(self.state.digits().is_complete())
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::replace(&mut self.state, PinEntryState::new(0));
        self.state = state.reduce(action);
    }

    fn reset(&mut self) {
        self.countdown = None;
        self.seconds_remaining = 0;
        self.mode = Mode::default();
        self.dispatch(Action::Initialize);
    }

    fn submit(&mut self) {
        if !self.state.digits().is_complete() || self.is_blocked() {
            return;
        }

        let pin = self.state.digits().pin();
        match self.mode.submit(pin) {
            Step::Verify(pin) => {
                self.phase = Phase::Verifying;
                let store = Arc::clone(&self.store);
                let key = self.config.store_key.clone();
                let events = self.events.clone();
                let generation = self.generation;
                tokio::spawn(async move {
                    let result = store
                        .get(&key)
                        .await
                        .map(|stored| stored.is_some_and(|stored| stored.as_str() == pin.as_str()));
                    let _ = events.send(EntryEvent {
                        generation,
                        kind: EventKind::Verified { pin, result },
                    });
                });
            }
            Step::Staged => {
                debug!("New PIN staged for confirmation");
                self.dispatch(Action::ClearDigits);
            }
            Step::Persist(pin) => {
                self.phase = Phase::Persisting;
                let store = Arc::clone(&self.store);
                let key = self.config.store_key.clone();
                let events = self.events.clone();
                let generation = self.generation;
                tokio::spawn(async move {
                    let result = store.set(&key, &pin).await;
                    let _ = events.send(EntryEvent {
                        generation,
                        kind: EventKind::Persisted { pin, result },
                    });
                });
            }
            Step::Mismatch => {
                debug!("PIN confirmation mismatch, back to create");
                self.dispatch(Action::ClearDigits);
                self.dispatch(Action::SetError(Some(EntryError::PinMismatch)));
            }
        }
    }

    fn on_probed(&mut self, result: Result<bool, StoreError>) {
        if self.phase != Phase::Probing {
            return;
        }

        self.mode = match result {
            Ok(exists) => Mode::from_probe(exists),
            Err(e) => {
                warn!("Credential probe failed: {}", e);
                self.dispatch(Action::SetError(Some(EntryError::Unexpected)));
                Mode::Check
            }
        };
        self.phase = Phase::Ready;
        debug!(mode = self.mode.name(), "PIN entry ready");
    }

    fn on_verified(&mut self, pin: Zeroizing<String>, result: Result<bool, StoreError>) {
        if self.phase != Phase::Verifying {
            return;
        }
        self.phase = Phase::Ready;

        match result {
            Ok(true) => {
                info!("PIN accepted");
                self.dispatch(Action::SetError(None));
                self.hooks.on_matches(&pin);
            }
            Ok(false) => self.record_failure(),
            Err(e) => {
                warn!("Credential read failed: {}", e);
                self.dispatch(Action::SetError(Some(EntryError::Unexpected)));
            }
        }
    }

    fn on_persisted(&mut self, pin: Zeroizing<String>, result: Result<(), StoreError>) {
        if self.phase != Phase::Persisting {
            return;
        }
        self.phase = Phase::Ready;

        match result {
            Ok(()) => {
                info!("New PIN stored");
                self.mode.persisted();
                self.dispatch(Action::SetError(None));
                self.hooks.on_matches(&pin);
            }
            Err(e) => {
                warn!("Credential write failed: {}", e);
                self.dispatch(Action::SetError(Some(EntryError::Unexpected)));
            }
        }
    }

    fn on_countdown(&mut self, deadline: Instant, tick: Tick) {
        let live = self.countdown.as_ref().map(CountdownHandle::deadline);
        if live != Some(deadline) || self.state.lockout_end_time() != Some(deadline) {
            debug!("Discarding countdown tick for a cleared lockout");
            return;
        }

        match tick {
            Tick::Remaining(secs) => self.seconds_remaining = secs,
            Tick::Unchanged => {}
            Tick::Expired => self.lift_lockout(),
        }
    }

    fn record_failure(&mut self) {
        self.dispatch(Action::IncrementAttempts {
            policy: self.policy,
            now: Instant::now(),
        });
        self.hooks.on_invalid_pin();

        match self.state.lockout_end_time() {
            Some(deadline) => {
                warn!(
                    attempts = self.state.attempts(),
                    "PIN entry locked for {:?}", self.policy.lockout_duration
                );
                self.start_countdown(deadline);
            }
            None => warn!(
                attempts = self.state.attempts(),
                "Incorrect PIN, {} attempts remaining",
                self.attempts_remaining()
            ),
        }
    }

    fn start_countdown(&mut self, deadline: Instant) {
        self.seconds_remaining = ceil_seconds(deadline.saturating_duration_since(Instant::now()));

        let events = self.events.clone();
        let generation = self.generation;
        // Replacing the slot drops, and so aborts, any previous countdown
        self.countdown = Some(CountdownHandle::spawn(
            deadline,
            self.config.countdown_tick(),
            move |tick| {
                events
                    .send(EntryEvent {
                        generation,
                        kind: EventKind::Countdown { deadline, tick },
                    })
                    .is_ok()
            },
        ));
    }

    fn expire_lockout_if_due(&mut self, now: Instant) {
        if self.state.lockout_elapsed(now) {
            self.lift_lockout();
        }
    }

    fn lift_lockout(&mut self) {
        self.countdown = None;
        self.seconds_remaining = 0;
        self.dispatch(Action::ResetLockout);
        info!("PIN lockout expired");
    }
}
