use std::borrow::Cow;

use ratatui::prelude::Stylize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

use super::notifications::Severity;
use super::theme::Theme;

/// Accent color used for prompts, highlights, and status badges.
pub const ACCENT: Color = Color::Indexed(208);

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub surface: Color,
    pub accent: Color,
    pub success: Color,
    pub danger: Color,
    pub warning: Color,
    pub info: Color,
}

const LIGHT: Palette = Palette {
    background: Color::Rgb(248, 249, 250),
    foreground: Color::Rgb(33, 37, 41),
    muted: Color::Rgb(108, 117, 125),
    surface: Color::Rgb(233, 236, 239),
    accent: ACCENT,
    success: Color::Rgb(25, 135, 84),
    danger: Color::Rgb(220, 53, 69),
    warning: Color::Rgb(176, 124, 0),
    info: Color::Rgb(13, 110, 253),
};

const DARK: Palette = Palette {
    background: Color::Rgb(26, 29, 33),
    foreground: Color::Rgb(222, 226, 230),
    muted: Color::Rgb(134, 142, 150),
    surface: Color::Rgb(43, 48, 53),
    accent: ACCENT,
    success: Color::Rgb(117, 183, 152),
    danger: Color::Rgb(234, 134, 143),
    warning: Color::Rgb(255, 218, 106),
    info: Color::Rgb(110, 168, 254),
};

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.success,
            Severity::Error => self.danger,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

/// Produce a dimmed line for secondary descriptions and hints.
pub fn secondary_line<'a>(text: impl Into<Cow<'a, str>>) -> Line<'a> {
    let owned = text.into().into_owned();
    Line::from(owned.dim())
}

/// Accent and bold on the theme's surface, for list selections.
pub fn selection_style(palette: &Palette) -> Style {
    Style::default()
        .fg(palette.accent)
        .bg(palette.surface)
        .add_modifier(Modifier::BOLD)
}
