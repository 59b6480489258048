//! Darkroom palette and derived styles

use ratatui::style::{Color, Modifier, Style};

/// Colors named after the darkroom they imitate
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    /// Safelight amber, used for titles and the active selection
    pub safelight: Color,
    /// Developer-tray teal, used for focus and filled PIN slots
    pub developer: Color,
    /// Dialog background
    pub tray: Color,
    /// Selection background
    pub mat: Color,
    /// Text, from brightest to dimmest
    pub print: Color,
    pub proof: Color,
    pub fog: Color,
    /// Inactive borders
    pub frame: Color,
    pub fixed: Color,
    pub caution: Color,
    pub overexposed: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            safelight: Color::Rgb(255, 171, 64),
            developer: Color::Rgb(38, 198, 218),
            tray: Color::Rgb(24, 26, 27),
            mat: Color::Rgb(55, 71, 79),
            print: Color::Rgb(250, 250, 250),
            proof: Color::Rgb(189, 189, 189),
            fog: Color::Rgb(117, 117, 117),
            frame: Color::Rgb(66, 66, 66),
            fixed: Color::Rgb(102, 187, 106),
            caution: Color::Rgb(255, 213, 79),
            overexposed: Color::Rgb(239, 83, 80),
        }
    }
}

/// Styles the screens draw with
#[derive(Clone, Copy, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    fn fg(color: Color) -> Style {
        Style::default().fg(color)
    }

    pub fn text(&self) -> Style {
        Self::fg(self.palette.print)
    }

    pub fn text_secondary(&self) -> Style {
        Self::fg(self.palette.proof)
    }

    /// Hints, help lines and in-flight status
    pub fn text_muted(&self) -> Style {
        Self::fg(self.palette.fog)
    }

    pub fn title(&self) -> Style {
        Self::fg(self.palette.safelight).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Self::fg(self.palette.frame)
    }

    pub fn border_focused(&self) -> Style {
        Self::fg(self.palette.developer)
    }

    pub fn success(&self) -> Style {
        Self::fg(self.palette.fixed)
    }

    pub fn warning(&self) -> Style {
        Self::fg(self.palette.caution)
    }

    /// Errors and the border of a shaking dialog
    pub fn danger(&self) -> Style {
        Self::fg(self.palette.overexposed).add_modifier(Modifier::BOLD)
    }

    /// Row style for the editor's adjustment list
    pub fn menu_item(&self, selected: bool) -> Style {
        if selected {
            self.title().bg(self.palette.mat)
        } else {
            self.text()
        }
    }

    /// Style for one PIN slot; empty slots recede into the dialog
    pub fn pin_slot(&self, filled: bool) -> Style {
        if filled {
            Self::fg(self.palette.developer).add_modifier(Modifier::BOLD)
        } else {
            self.text_muted()
        }
    }

    pub fn surface(&self) -> Style {
        Style::default().bg(self.palette.tray)
    }
}
