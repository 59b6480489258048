//! Application state

/// Current screen/view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Landing screen with editing locked
    #[default]
    Home,

    /// PIN modal over the home screen
    PinEntry,

    /// Photo editor, reachable only after a PIN match
    Editor,
}

/// Editor adjustments shown once unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Exposure,
    Contrast,
    Saturation,
}

impl Adjustment {
    pub const ALL: [Adjustment; 3] = [
        Adjustment::Exposure,
        Adjustment::Contrast,
        Adjustment::Saturation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Adjustment::Exposure => "Exposure",
            Adjustment::Contrast => "Contrast",
            Adjustment::Saturation => "Saturation",
        }
    }
}

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Current screen
    pub current_screen: Screen,

    /// Selected editor adjustment
    pub adjustment_index: usize,

    /// Adjustment values, -100..=100
    pub adjustments: [i8; 3],

    /// Status message to display
    pub status_message: Option<String>,

    /// Remaining frames of the invalid-PIN shake
    pub shake_frames: u8,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self {
            current_screen: Screen::Home,
            adjustment_index: 0,
            adjustments: [0; 3],
            status_message: None,
            shake_frames: 0,
        }
    }

    /// Currently selected adjustment
    pub fn selected_adjustment(&self) -> Adjustment {
        Adjustment::ALL[self.adjustment_index]
    }

    /// Nudge the selected adjustment by `delta`, clamped to -100..=100
    pub fn nudge(&mut self, delta: i8) {
        let value = &mut self.adjustments[self.adjustment_index];
        *value = value.saturating_add(delta).clamp(-100, 100);
    }

    /// Clear status messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
    }
}
