//! Event handling for the TUI

use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use photolab_auth::{EntryEvent, EntryHooks};

/// Events raised by the PIN gate for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// PIN verified or newly created
    Unlocked,
    /// A PIN check failed
    InvalidPin,
}

/// One wake-up of the main loop
#[derive(Debug)]
pub enum Event {
    /// Keyboard input
    Key(KeyEvent),
    /// Terminal resize or other input that only needs a redraw
    Redraw,
    /// Background result for the PIN gate
    Entry(EntryEvent),
    /// Hook callback from the PIN gate
    App(AppEvent),
    /// Render tick (for animations)
    Tick,
}

/// Receivers for everything that is not terminal input
pub struct EventChannels {
    pub entry: mpsc::UnboundedReceiver<EntryEvent>,
    pub app: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventChannels {
    /// Create the channels, returning their senders
    pub fn new() -> (
        Self,
        mpsc::UnboundedSender<EntryEvent>,
        mpsc::UnboundedSender<AppEvent>,
    ) {
        let (entry_tx, entry) = mpsc::unbounded_channel();
        let (app_tx, app) = mpsc::unbounded_channel();
        (Self { entry, app }, entry_tx, app_tx)
    }

    /// Wait for the next internal event
    pub async fn recv(&mut self) -> Option<Event> {
        tokio::select! {
            Some(event) = self.entry.recv() => Some(Event::Entry(event)),
            Some(event) = self.app.recv() => Some(Event::App(event)),
            else => None,
        }
    }

    /// Take the next internal event without waiting
    pub fn try_recv(&mut self) -> Option<Event> {
        if let Ok(event) = self.app.try_recv() {
            return Some(Event::App(event));
        }
        self.entry.try_recv().ok().map(Event::Entry)
    }
}

/// PIN gate hooks that forward to the application channel
pub struct UiHooks {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl UiHooks {
    pub fn new(sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }
}

impl EntryHooks for UiHooks {
    fn on_matches(&mut self, _pin: &str) {
        let _ = self.sender.send(AppEvent::Unlocked);
    }

    fn on_invalid_pin(&mut self) {
        let _ = self.sender.send(AppEvent::InvalidPin);
    }
}
