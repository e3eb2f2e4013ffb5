//! UI Theme Module - color palette and style helpers for the keypad
//!
//! Provides a centralized theme for the rpnpad TUI with:
//! - Palette tokens (not hard-coded colors)
//! - Style helpers for keys, stack and status
//! - Dark and high-contrast variants selected from config

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

use rpnpad_core::config::ThemeName;

/// Color palette tokens for the theme
#[derive(Clone, Debug)]
pub struct Palette {
    /// Main background color
    pub bg: Color,
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (blank keys)
    pub text_muted: Color,
    /// Accent color (page name, entry line)
    pub accent: Color,
    /// Soft key face
    pub soft_key: Color,
    /// Hard key face
    pub hard_key: Color,
    /// Operator and command hard keys
    pub operator: Color,
    /// Page-switch hard keys
    pub page_key: Color,
    /// Status line when the evaluator reports a problem
    pub error: Color,
    /// Key hint text
    pub key_hint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    /// VS Code-esque dark theme
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255),     // Light blue
            soft_key: Color::Rgb(156, 220, 254),  // Light cyan
            hard_key: Color::Rgb(212, 212, 212),
            operator: Color::Rgb(220, 180, 100),  // Amber
            page_key: Color::Rgb(78, 201, 176),   // Teal green
            error: Color::Rgb(244, 135, 113),     // Coral red
            key_hint: Color::Rgb(206, 145, 120),  // Soft orange
        }
    }

    /// High contrast theme variant
    pub fn high_contrast() -> Self {
        Self {
            bg: Color::Black,
            panel_border: Color::White,
            text: Color::White,
            text_dim: Color::Rgb(200, 200, 200),
            text_muted: Color::Rgb(150, 150, 150),
            accent: Color::Cyan,
            soft_key: Color::Cyan,
            hard_key: Color::White,
            operator: Color::Yellow,
            page_key: Color::Green,
            error: Color::Red,
            key_hint: Color::Yellow,
        }
    }

    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::HighContrast => Self::high_contrast(),
        }
    }
}

/// What a hard key does, as far as coloring goes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardKeyTone {
    Digit,
    Operator,
    Page,
}

/// Theme configuration
#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Style for a soft key cell
    pub fn soft_key_style(&self, assigned: bool) -> Style {
        if assigned {
            Style::default().fg(self.palette.soft_key)
        } else {
            Style::default().fg(self.palette.text_muted)
        }
    }

    /// Style for a hard key cell
    pub fn hard_key_style(&self, tone: HardKeyTone) -> Style {
        match tone {
            HardKeyTone::Digit => Style::default().fg(self.palette.hard_key),
            HardKeyTone::Operator => Style::default().fg(self.palette.operator),
            HardKeyTone::Page => Style::default()
                .fg(self.palette.page_key)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Style for the stack display
    pub fn stack_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    /// Style for the pending entry line
    pub fn entry_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Status line; evaluator errors show in the error color
    pub fn status_style(&self, status: &str) -> Style {
        let lower = status.to_ascii_lowercase();
        if lower.starts_with("error") || lower.starts_with("unknown") {
            Style::default().fg(self.palette.error)
        } else {
            Style::default().fg(self.palette.text_dim)
        }
    }

    /// Style for the current page name
    pub fn page_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key hints in footer
    pub fn key_hint_style(&self) -> Style {
        Style::default().fg(self.palette.key_hint)
    }

    /// Background for the whole screen
    pub fn screen_style(&self) -> Style {
        Style::default().bg(self.palette.bg)
    }

    /// Style for panel borders
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.palette.panel_border)
    }

    /// Style for dimmed text
    pub fn text_dim_style(&self) -> Style {
        Style::default().fg(self.palette.text_dim)
    }
}

static THEME: OnceLock<Theme> = OnceLock::new();

/// Pick the palette once at start-up; later calls are ignored
pub fn init(name: ThemeName) {
    let _ = THEME.set(Theme::new(Palette::named(name)));
}

/// The active theme (dark until `init` is called)
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

/// Convenience re-exports for common use cases
pub mod styles {
    use super::*;

    pub fn soft_key(assigned: bool) -> Style {
        theme().soft_key_style(assigned)
    }

    pub fn hard_key(tone: HardKeyTone) -> Style {
        theme().hard_key_style(tone)
    }

    pub fn stack() -> Style {
        theme().stack_style()
    }

    pub fn entry() -> Style {
        theme().entry_style()
    }

    pub fn status(status: &str) -> Style {
        theme().status_style(status)
    }

    pub fn page() -> Style {
        theme().page_style()
    }

    pub fn key_hint() -> Style {
        theme().key_hint_style()
    }

    pub fn screen() -> Style {
        theme().screen_style()
    }

    pub fn border() -> Style {
        theme().border_style()
    }

    pub fn text_dim() -> Style {
        theme().text_dim_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_palette() {
        assert_eq!(Palette::named(ThemeName::HighContrast).bg, Color::Black);
        assert_eq!(Palette::named(ThemeName::Dark).bg, Color::Reset);
    }

    #[test]
    fn test_status_style() {
        let theme = Theme::default();
        assert_eq!(theme.status_style("unknown page: x").fg, Some(theme.palette.error));
        assert_eq!(theme.status_style("ok: 3").fg, Some(theme.palette.text_dim));
    }
}
