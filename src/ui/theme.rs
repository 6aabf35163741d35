//! Theme and styling configuration.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application.
pub struct Theme {
    /// Accent color for titles and focused widgets.
    pub accent: Color,
    /// Color for focused input borders.
    pub focus: Color,
    /// Secondary text.
    pub muted: Color,
    /// Marker for selected items.
    pub selected: Color,
    /// Warnings and epic markers.
    pub warning: Color,
    /// Errors.
    pub error: Color,
}

static THEME: Theme = Theme {
    accent: Color::Cyan,
    focus: Color::Yellow,
    muted: Color::DarkGray,
    selected: Color::Green,
    warning: Color::Yellow,
    error: Color::Red,
};

/// The active theme.
pub fn theme() -> &'static Theme {
    &THEME
}

impl Theme {
    /// Border style for a block that may have focus.
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus)
        } else {
            Style::default().fg(self.muted)
        }
    }

    /// Style for block titles.
    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Style for the highlighted row of a list.
    pub fn cursor_row(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}
