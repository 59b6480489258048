#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use photolab_auth::{Action, Digit, EntryError, LockoutPolicy, PinEntryState};
use tokio::time::Instant;

#[derive(Arbitrary, Debug)]
enum FuzzAction {
    Initialize,
    AddDigit(u8),
    RemoveDigit,
    ClearDigits,
    Fail { advance_ms: u16 },
    ResetLockout,
    ClearError,
}

#[derive(Arbitrary, Debug)]
struct Input {
    pin_length: u8,
    max_attempts: u8,
    lockout_ms: u16,
    actions: Vec<FuzzAction>,
}

fuzz_target!(|input: Input| {
    let pin_length = usize::from(input.pin_length % 16);
    let policy = LockoutPolicy::new(
        u32::from(input.max_attempts).max(1),
        Duration::from_millis(u64::from(input.lockout_ms)),
    );
    let start = Instant::now();
    let mut now = start;
    let mut state = PinEntryState::new(pin_length);

    for action in input.actions {
        let before_attempts = state.attempts();
        let action = match action {
            FuzzAction::Initialize => Action::Initialize,
            FuzzAction::AddDigit(d) => match Digit::new(d % 10) {
                Some(digit) => Action::AddDigit(digit),
                None => continue,
            },
            FuzzAction::RemoveDigit => Action::RemoveDigit,
            FuzzAction::ClearDigits => Action::ClearDigits,
            FuzzAction::Fail { advance_ms } => {
                now += Duration::from_millis(u64::from(advance_ms));
                Action::IncrementAttempts { policy, now }
            }
            FuzzAction::ResetLockout => Action::ResetLockout,
            FuzzAction::ClearError => Action::SetError(None),
        };
        let is_failure = matches!(action, Action::IncrementAttempts { .. });
        state = state.reduce(action);

        // Slot count never changes and filled slots stay a prefix
        let digits = state.digits();
        assert_eq!(digits.len(), pin_length);
        let filled = digits.filled();
        assert!(digits.slots()[..filled].iter().all(Option::is_some));
        assert!(digits.slots()[filled..].iter().all(Option::is_none));

        if is_failure {
            assert_eq!(state.attempts(), before_attempts.saturating_add(1));
            assert!(digits.is_empty());
            if state.attempts() >= policy.max_attempts {
                assert!(state.is_locked());
                assert!(matches!(
                    state.error(),
                    Some(EntryError::TooManyAttempts { .. })
                ));
            }
        }
    }
});
