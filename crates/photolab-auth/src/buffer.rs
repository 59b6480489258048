//! Fixed-length digit buffer backing the PIN pad
//!
//! Slots fill left to right and empty right to left, so the filled slots are
//! always a prefix of the buffer.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

/// A single decimal digit (0-9)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Digit(u8);

impl Digit {
    /// Create a digit from its numeric value
    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    /// Create a digit from an ASCII character
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self(d as u8))
    }

    /// Numeric value
    pub fn value(self) -> u8 {
        self.0
    }

    fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl fmt::Debug for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Digit(*)")
    }
}

/// Ordered PIN slots, each empty or holding one digit
///
/// Contents are wiped when the buffer is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct DigitBuffer {
    slots: Vec<Option<u8>>,
}

impl DigitBuffer {
    /// Create an empty buffer with `len` slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Total number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no slot is filled
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// True when every slot is filled
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Fill the first empty slot. Returns false if the buffer was full.
    pub fn push(&mut self, digit: Digit) -> bool {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(digit.value());
                true
            }
            None => false,
        }
    }

    /// Empty the last filled slot. Returns false if the buffer was empty.
    pub fn pop(&mut self) -> bool {
        match self.slots.iter().rposition(Option::is_some) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Slot contents, for rendering
    pub fn slots(&self) -> &[Option<u8>] {
        &self.slots
    }

    /// Filled digits joined into a string
    pub fn pin(&self) -> Zeroizing<String> {
        Zeroizing::new(
            self.slots
                .iter()
                .flatten()
                .map(|&d| Digit(d).as_char())
                .collect(),
        )
    }
}

impl Drop for DigitBuffer {
    fn drop(&mut self) {
        self.slots.zeroize();
    }
}

impl fmt::Debug for DigitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitBuffer")
            .field("len", &self.len())
            .field("filled", &self.filled())
            .finish()
    }
}
