//! Application state and event handling

mod events;
mod state;

pub use events::{AppEvent, Event, EventChannels, UiHooks};
pub use state::{Adjustment, AppState, Screen};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use futures::StreamExt;
use ratatui::prelude::*;
use tracing::{debug, info};

use photolab_auth::{CredentialStore, Digit, PinConfig, PinEntry, PinInput};

use crate::ui::{self, Theme};

/// Render tick rate
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Ticks the PIN modal shakes for after an invalid PIN
pub const SHAKE_FRAMES: u8 = 6;

/// Step applied to an editor adjustment per key press
const ADJUSTMENT_STEP: i8 = 5;

/// Main application struct
pub struct App {
    /// Application state
    pub state: AppState,

    /// Visual theme
    pub theme: Theme,

    /// PIN gate guarding the editor
    pub entry: PinEntry,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Tick counter for animations
    pub tick: u64,

    channels: EventChannels,
}

impl App {
    /// Create a new application instance
    pub fn new(config: PinConfig, store: Arc<dyn CredentialStore>) -> Self {
        let (channels, entry_tx, app_tx) = EventChannels::new();
        let entry = PinEntry::new(config, store, Box::new(UiHooks::new(app_tx)), entry_tx);

        Self {
            state: AppState::new(),
            theme: Theme::default(),
            entry,
            should_quit: false,
            tick: 0,
            channels,
        }
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut input = EventStream::new();
        let mut ticker = tokio::time::interval(TICK_RATE);

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            let event = tokio::select! {
                maybe = input.next() => match maybe {
                    Some(Ok(CrosstermEvent::Key(key))) => Event::Key(key),
                    Some(Ok(_)) => Event::Redraw,
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(event) = self.channels.recv() => event,
                _ = ticker.tick() => Event::Tick,
            };

            self.handle_event(event);
        }

        Ok(())
    }

    /// Wait for one internal event and apply it
    pub async fn process_next_event(&mut self) {
        if let Some(event) = self.channels.recv().await {
            self.handle_event(event);
        }
    }

    /// Apply every internal event that is already queued
    pub fn drain_pending(&mut self) {
        while let Some(event) = self.channels.try_recv() {
            self.handle_event(event);
        }
    }

    /// Apply one main-loop event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::Key(_) | Event::Redraw => {}
            Event::Entry(event) => self.entry.handle_event(event),
            Event::App(event) => self.handle_app_event(event),
            Event::Tick => self.on_tick(),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        self.handle_key(key.code);
    }

    /// Handle key press events
    pub fn handle_key(&mut self, key: KeyCode) {
        match self.state.current_screen {
            Screen::Home => self.handle_home_key(key),
            Screen::PinEntry => self.handle_pin_entry_key(key),
            Screen::Editor => self.handle_editor_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('e') | KeyCode::Enter => self.open_pin_entry(),
            _ => {}
        }
    }

    fn handle_pin_entry_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.close_pin_entry(),
            KeyCode::Char(c) => {
                if let Some(digit) = Digit::from_char(c) {
                    self.entry.handle_input(PinInput::Digit(digit));
                }
            }
            KeyCode::Backspace => self.entry.handle_input(PinInput::Backspace),
            KeyCode::Delete => self.entry.handle_input(PinInput::Clear),
            KeyCode::Enter => self.entry.handle_input(PinInput::Submit),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.lock_editor(),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.state.adjustment_index > 0 {
                    self.state.adjustment_index -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.adjustment_index < Adjustment::ALL.len() - 1 {
                    self.state.adjustment_index += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.state.nudge(-ADJUSTMENT_STEP),
            KeyCode::Right | KeyCode::Char('l') => self.state.nudge(ADJUSTMENT_STEP),
            _ => {}
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Unlocked => {
                // The modal may have been dismissed while the check was in flight
                if self.state.current_screen != Screen::PinEntry {
                    debug!("Ignoring unlock outside the PIN modal");
                    return;
                }
                self.entry.close();
                self.state.shake_frames = 0;
                self.state.current_screen = Screen::Editor;
                self.state.status_message = Some("Editor unlocked".to_string());
                info!("Editor unlocked");
            }
            AppEvent::InvalidPin => {
                self.state.shake_frames = SHAKE_FRAMES;
            }
        }
    }

    fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.state.shake_frames = self.state.shake_frames.saturating_sub(1);
    }

    fn open_pin_entry(&mut self) {
        self.state.clear_messages();
        self.state.current_screen = Screen::PinEntry;
        self.entry.open();
    }

    fn close_pin_entry(&mut self) {
        self.entry.close();
        self.state.shake_frames = 0;
        self.state.current_screen = Screen::Home;
    }

    fn lock_editor(&mut self) {
        self.state.current_screen = Screen::Home;
        self.state.status_message = Some("Editor locked".to_string());
        info!("Editor locked");
    }
}
