//! Entry mode state machine
//!
//! ```text
//!   probe: exists ──► Check ──(submit)──► Verify against store
//!   probe: absent ──► Create ──(submit)──► Confirm { pending }
//!                       ▲                     │
//!                       └──── mismatch ───────┤
//!                                             └── match ──► Persist ──► Check
//! ```

use std::fmt;

use zeroize::Zeroizing;

/// What the entry surface is currently doing with a complete PIN
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// A PIN exists; verify the entry against it
    #[default]
    Check,
    /// No PIN exists; collect a new one
    Create,
    /// A new PIN was collected; re-enter it to confirm
    Confirm { pending: Zeroizing<String> },
}

/// Work the controller must do after a submission
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    /// Compare the PIN against the stored credential
    Verify(Zeroizing<String>),
    /// The PIN was staged for confirmation
    Staged,
    /// The confirmation matched; write the PIN to the store
    Persist(Zeroizing<String>),
    /// The confirmation did not match; start over in `Create`
    Mismatch,
}

impl Mode {
    /// Initial mode from the credential existence probe
    pub fn from_probe(exists: bool) -> Self {
        if exists {
            Mode::Check
        } else {
            Mode::Create
        }
    }

    /// Advance the machine with a complete PIN
    pub fn submit(&mut self, pin: Zeroizing<String>) -> Step {
        match self {
            Mode::Check => Step::Verify(pin),
            Mode::Create => {
                *self = Mode::Confirm { pending: pin };
                Step::Staged
            }
            Mode::Confirm { pending } => {
                if *pending == pin {
                    Step::Persist(pin)
                } else {
                    *self = Mode::Create;
                    Step::Mismatch
                }
            }
        }
    }

    /// The new PIN was stored; it now has to be checked
    pub fn persisted(&mut self) {
        *self = Mode::Check;
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Check => "check",
            Mode::Create => "create",
            Mode::Confirm { .. } => "confirm",
        }
    }

    /// Instruction shown above the PIN slots
    pub fn prompt(&self, pin_length: usize) -> String {
        match self {
            Mode::Check => format!("Please enter your {pin_length}-digit PIN to continue."),
            Mode::Create => format!("Please create a new {pin_length}-digit PIN."),
            Mode::Confirm { .. } => "Please confirm your PIN by entering it again.".to_string(),
        }
    }

    /// Label for the submit action
    pub fn action_label(&self, complete: bool) -> &'static str {
        match (self, complete) {
            (Mode::Check, true) => "Continue",
            (Mode::Check, false) => "Enter PIN",
            (Mode::Create, true) => "Next",
            (Mode::Create, false) => "Create PIN",
            (Mode::Confirm { .. }, _) => "Confirm PIN",
        }
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Check => f.write_str("Check"),
            Mode::Create => f.write_str("Create"),
            Mode::Confirm { .. } => f.write_str("Confirm { pending: <redacted> }"),
        }
    }
}
