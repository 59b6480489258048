//! Integration tests for the PIN entry surface
//!
//! Every test runs on a paused Tokio clock, so lockout windows elapse as soon
//! as the runtime has nothing else to do.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use zeroize::Zeroizing;

use photolab_auth::{
    CredentialStore, Digit, EntryError, EntryEvent, EntryHooks, MemoryStore, Mode, Phase,
    PinConfig, PinEntry, PinInput, StoreError, SECURE_KEY,
};

// ============================================
// Test Doubles
// ============================================

#[derive(Default)]
struct HookLog {
    matches: Vec<String>,
    completes: Vec<String>,
    invalid: usize,
}

#[derive(Clone, Default)]
struct RecordingHooks(Arc<Mutex<HookLog>>);

impl RecordingHooks {
    fn matches(&self) -> Vec<String> {
        self.0.lock().unwrap().matches.clone()
    }

    fn completes(&self) -> Vec<String> {
        self.0.lock().unwrap().completes.clone()
    }

    fn invalid(&self) -> usize {
        self.0.lock().unwrap().invalid
    }
}

impl EntryHooks for RecordingHooks {
    fn on_matches(&mut self, pin: &str) {
        self.0.lock().unwrap().matches.push(pin.to_string());
    }

    fn on_pin_complete(&mut self, pin: &str) {
        self.0.lock().unwrap().completes.push(pin.to_string());
    }

    fn on_invalid_pin(&mut self) {
        self.0.lock().unwrap().invalid += 1;
    }
}

/// Memory store whose reads and writes can be switched to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn with_pin(pin: &str) -> Self {
        Self {
            inner: MemoryStore::with_entry(SECURE_KEY, pin),
            ..Self::default()
        }
    }
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failure".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }
}

/// Memory store whose reads wait until released
struct GatedStore {
    inner: MemoryStore,
    gate: Notify,
}

#[async_trait]
impl CredentialStore for GatedStore {
    async fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        self.gate.notified().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.exists(key).await
    }
}

// ============================================
// Harness
// ============================================

struct Harness {
    entry: PinEntry,
    events: mpsc::UnboundedReceiver<EntryEvent>,
    hooks: RecordingHooks,
}

impl Harness {
    fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_config(store, PinConfig::default())
    }

    fn with_config(store: Arc<dyn CredentialStore>, config: PinConfig) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let hooks = RecordingHooks::default();
        let entry = PinEntry::new(config, store, Box::new(hooks.clone()), tx);
        Self {
            entry,
            events,
            hooks,
        }
    }

    async fn open(&mut self) {
        self.entry.open();
        self.settle().await;
    }

    /// Apply events until no store call is in flight
    async fn settle(&mut self) {
        while matches!(
            self.entry.phase(),
            Phase::Probing | Phase::Verifying | Phase::Persisting
        ) {
            let event = self.events.recv().await.expect("entry channel closed");
            self.entry.handle_event(event);
        }
    }

    fn type_digits(&mut self, pin: &str) {
        for c in pin.chars() {
            let digit = Digit::from_char(c).expect("test PINs are numeric");
            self.entry.handle_input(PinInput::Digit(digit));
        }
    }

    async fn enter(&mut self, pin: &str) {
        self.type_digits(pin);
        self.settle().await;
    }

    /// Apply events until the lockout lifts, recording each seconds value shown
    async fn wait_unlocked(&mut self) -> Vec<u64> {
        let mut shown = vec![self.entry.seconds_remaining()];
        while self.entry.state().is_locked() {
            let event = self.events.recv().await.expect("entry channel closed");
            self.entry.handle_event(event);
            if shown.last() != Some(&self.entry.seconds_remaining()) {
                shown.push(self.entry.seconds_remaining());
            }
        }
        shown
    }
}

// ============================================
// Create and Confirm
// ============================================

#[tokio::test(start_paused = true)]
async fn test_first_run_creates_and_stores_pin() {
    let store = Arc::new(MemoryStore::new());
    let mut harness = Harness::new(store.clone());

    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Create);
    assert_eq!(harness.entry.prompt(), "Please create a new 6-digit PIN.");

    harness.enter("123456").await;
    assert_eq!(harness.entry.mode().name(), "confirm");
    assert!(harness.entry.state().digits().is_empty());
    assert_eq!(store.write_count(), 0);

    harness.enter("123456").await;
    assert_eq!(harness.entry.mode(), &Mode::Check);
    assert_eq!(harness.hooks.matches(), vec!["123456".to_string()]);
    assert_eq!(store.write_count(), 1);
    assert_eq!(
        store.get(SECURE_KEY).await.unwrap().unwrap().as_str(),
        "123456"
    );
}

#[tokio::test(start_paused = true)]
async fn test_confirm_mismatch_returns_to_create() {
    let store = Arc::new(MemoryStore::new());
    let mut harness = Harness::new(store.clone());
    harness.open().await;

    harness.enter("123456").await;
    harness.enter("654321").await;

    assert_eq!(harness.entry.mode(), &Mode::Create);
    assert_eq!(
        harness.entry.state().error(),
        Some(&EntryError::PinMismatch)
    );
    assert_eq!(
        harness.entry.state().error().unwrap().to_string(),
        "PINs do not match. Please try again."
    );
    assert!(harness.entry.state().digits().is_empty());
    assert_eq!(harness.entry.state().attempts(), 0);
    assert!(harness.hooks.matches().is_empty());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_stored_value_means_create() {
    let store = Arc::new(MemoryStore::with_entry(SECURE_KEY, ""));
    let mut harness = Harness::new(store);
    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Create);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_from_confirm_resets_to_create() {
    let store = Arc::new(MemoryStore::new());
    let mut harness = Harness::new(store.clone());
    harness.open().await;

    harness.enter("123456").await;
    assert_eq!(harness.entry.mode().name(), "confirm");

    harness.entry.close();
    assert_eq!(harness.entry.mode(), &Mode::Check);

    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Create);
    assert!(harness.entry.state().digits().is_empty());
    assert!(harness.entry.state().error().is_none());

    // The abandoned PIN cannot be confirmed
    harness.enter("123456").await;
    assert_eq!(harness.entry.mode().name(), "confirm");
    assert!(harness.hooks.matches().is_empty());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_follows_stored_credential() {
    let store = Arc::new(MemoryStore::new());
    let mut harness = Harness::new(store.clone());

    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Create);
    harness.entry.close();

    store.set(SECURE_KEY, "123456").await.unwrap();
    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Check);
    harness.entry.close();

    store.delete(SECURE_KEY).await.unwrap();
    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Create);
}

// ============================================
// Check and Lockout
// ============================================

#[tokio::test(start_paused = true)]
async fn test_correct_pin_matches() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;
    assert_eq!(harness.entry.mode(), &Mode::Check);
    assert_eq!(
        harness.entry.prompt(),
        "Please enter your 6-digit PIN to continue."
    );

    harness.enter("123456").await;

    assert_eq!(harness.hooks.matches(), vec!["123456".to_string()]);
    assert_eq!(harness.hooks.completes(), vec!["123456".to_string()]);
    assert_eq!(harness.entry.state().attempts(), 0);
    assert!(harness.entry.state().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_wrong_pin_counts_attempt() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;

    harness.enter("000000").await;

    let state = harness.entry.state();
    assert_eq!(state.attempts(), 1);
    assert!(state.digits().is_empty());
    assert!(!state.is_locked());
    assert_eq!(
        state.error().unwrap().to_string(),
        "Incorrect PIN. 2 attempts remaining."
    );
    assert_eq!(harness.hooks.invalid(), 1);
    assert!(harness.hooks.matches().is_empty());
    assert_eq!(harness.entry.attempts_remaining(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_third_failure_locks_and_blocks_input() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;

    for _ in 0..3 {
        harness.enter("000000").await;
    }

    assert!(harness.entry.state().is_locked());
    assert!(harness.entry.is_blocked());
    assert_eq!(harness.entry.state().attempts(), 3);
    assert_eq!(harness.entry.seconds_remaining(), 30);
    assert_eq!(
        harness.entry.state().error().unwrap().to_string(),
        "Too many attempts. Try again in 30 seconds."
    );
    assert_eq!(harness.hooks.invalid(), 3);

    // The correct PIN is ignored while locked
    harness.type_digits("123456");
    assert!(harness.entry.state().digits().is_empty());
    assert!(harness.hooks.matches().is_empty());
    assert_eq!(harness.hooks.completes().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_lockout_counts_down_and_lifts() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;
    for _ in 0..3 {
        harness.enter("000000").await;
    }

    let locked_at = Instant::now();
    let shown = harness.wait_unlocked().await;

    assert!(locked_at.elapsed() >= Duration::from_secs(30));
    assert_eq!(shown, (0..=30).rev().collect::<Vec<u64>>());
    assert!(harness.entry.state().error().is_none());
    assert!(!harness.entry.is_blocked());

    harness.enter("123456").await;
    assert_eq!(harness.hooks.matches(), vec!["123456".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_attempts_survive_lockout_until_reopen() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;
    for _ in 0..3 {
        harness.enter("000000").await;
    }
    harness.wait_unlocked().await;
    assert_eq!(harness.entry.state().attempts(), 3);

    // One more miss re-locks immediately
    harness.enter("000000").await;
    assert_eq!(harness.entry.state().attempts(), 4);
    assert!(harness.entry.state().is_locked());

    harness.entry.close();
    harness.open().await;
    assert_eq!(harness.entry.state().attempts(), 0);
    assert!(!harness.entry.state().is_locked());
    assert_eq!(harness.entry.seconds_remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_lockout_lifts_on_next_input() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;
    for _ in 0..3 {
        harness.enter("000000").await;
    }

    // Let the deadline pass without draining countdown events
    tokio::time::advance(Duration::from_secs(31)).await;
    harness.type_digits("1");

    assert!(!harness.entry.state().is_locked());
    assert_eq!(harness.entry.state().digits().filled(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_lockout() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;
    for _ in 0..3 {
        harness.enter("000000").await;
    }

    harness.entry.close();
    assert_eq!(harness.entry.phase(), Phase::Closed);
    assert!(!harness.entry.state().is_locked());

    // Queued countdown ticks belong to the closed surface
    while let Ok(event) = harness.events.try_recv() {
        harness.entry.handle_event(event);
    }
    assert_eq!(harness.entry.seconds_remaining(), 0);

    harness.open().await;
    harness.enter("123456").await;
    assert_eq!(harness.hooks.matches(), vec!["123456".to_string()]);
}

// ============================================
// Editing
// ============================================

#[tokio::test(start_paused = true)]
async fn test_backspace_and_clear() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;

    harness.type_digits("123");
    harness.entry.handle_input(PinInput::Backspace);
    assert_eq!(
        harness.entry.state().digits().slots(),
        &[Some(1), Some(2), None, None, None, None]
    );

    harness.entry.handle_input(PinInput::Clear);
    assert!(harness.entry.state().digits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_error_survives_noop_edits() {
    let mut harness = Harness::new(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")));
    harness.open().await;
    harness.enter("000000").await;
    assert!(harness.entry.state().error().is_some());

    // Nothing to remove, so the message stays
    harness.entry.handle_input(PinInput::Backspace);
    assert!(harness.entry.state().error().is_some());

    harness.type_digits("1");
    assert!(harness.entry.state().error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_manual_submit() {
    let config = PinConfig {
        auto_submit: false,
        ..PinConfig::default()
    };
    let mut harness =
        Harness::with_config(Arc::new(MemoryStore::with_entry(SECURE_KEY, "123456")), config);
    harness.open().await;

    harness.entry.handle_input(PinInput::Submit);
    assert_eq!(harness.entry.phase(), Phase::Ready);

    harness.type_digits("123456");
    assert_eq!(harness.entry.phase(), Phase::Ready);
    assert_eq!(harness.hooks.completes().len(), 1);
    assert_eq!(harness.entry.action_label(), "Continue");

    harness.entry.handle_input(PinInput::Submit);
    assert_eq!(harness.entry.phase(), Phase::Verifying);
    harness.settle().await;
    assert_eq!(harness.hooks.matches(), vec!["123456".to_string()]);
}

// ============================================
// Store Failures and Late Results
// ============================================

#[tokio::test(start_paused = true)]
async fn test_probe_failure_falls_back_to_check() {
    let store = FlakyStore::default();
    store.fail_reads.store(true, Ordering::SeqCst);
    let mut harness = Harness::new(Arc::new(store));

    harness.open().await;

    assert_eq!(harness.entry.phase(), Phase::Ready);
    assert_eq!(harness.entry.mode(), &Mode::Check);
    assert_eq!(harness.entry.state().error(), Some(&EntryError::Unexpected));
}

#[tokio::test(start_paused = true)]
async fn test_read_failure_keeps_digits_and_attempts() {
    let store = Arc::new(FlakyStore::with_pin("123456"));
    let mut harness = Harness::new(store.clone());
    harness.open().await;

    store.fail_reads.store(true, Ordering::SeqCst);
    harness.enter("123456").await;

    assert_eq!(
        harness.entry.state().error().unwrap().to_string(),
        "An error occurred. Please try again."
    );
    assert_eq!(harness.entry.state().attempts(), 0);
    assert!(harness.entry.state().digits().is_complete());
    assert_eq!(harness.hooks.invalid(), 0);

    store.fail_reads.store(false, Ordering::SeqCst);
    harness.entry.handle_input(PinInput::Submit);
    harness.settle().await;
    assert_eq!(harness.hooks.matches(), vec!["123456".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_write_failure_stays_in_confirm() {
    let store = Arc::new(FlakyStore::default());
    let mut harness = Harness::new(store.clone());
    harness.open().await;

    harness.enter("135790").await;
    store.fail_writes.store(true, Ordering::SeqCst);
    harness.enter("135790").await;
    assert_eq!(harness.entry.mode().name(), "confirm");
    assert_eq!(harness.entry.state().error(), Some(&EntryError::Unexpected));
    assert!(harness.hooks.matches().is_empty());

    store.fail_writes.store(false, Ordering::SeqCst);
    harness.entry.handle_input(PinInput::Submit);
    harness.settle().await;
    assert_eq!(harness.entry.mode(), &Mode::Check);
    assert_eq!(harness.hooks.matches(), vec!["135790".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_result_after_close_is_discarded() {
    let store = Arc::new(GatedStore {
        inner: MemoryStore::with_entry(SECURE_KEY, "123456"),
        gate: Notify::new(),
    });
    let mut harness = Harness::new(store.clone());
    harness.open().await;

    harness.type_digits("123456");
    assert_eq!(harness.entry.phase(), Phase::Verifying);

    // Input is ignored while the check is in flight
    harness.entry.handle_input(PinInput::Backspace);
    assert!(harness.entry.state().digits().is_complete());

    harness.entry.close();
    store.gate.notify_one();

    let event = harness.events.recv().await.unwrap();
    harness.entry.handle_event(event);

    assert!(harness.hooks.matches().is_empty());
    assert_eq!(harness.entry.phase(), Phase::Closed);
}
