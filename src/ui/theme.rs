use crate::models::{ProbeVerdict, Status};
use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const DIM: Color = Color::DarkGray;
    pub const ACCENT: Color = Color::Green;
    pub const HIGHLIGHT: Color = Color::Cyan;

    // Status colors
    pub const GOOD: Color = Color::Green;
    pub const CAUTION: Color = Color::Yellow;
    pub const CRITICAL: Color = Color::Red;

    // Chart colors
    pub const GREENHOUSE: Color = Color::LightGreen;
    pub const OUTDOOR: Color = Color::LightBlue;
    pub const PROBE_FIRST: Color = Color::LightMagenta;
    pub const PROBE_SECOND: Color = Color::LightCyan;

    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::FG).add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_color(status: Status) -> Color {
        match status {
            Status::Good => Self::GOOD,
            Status::Caution => Self::CAUTION,
            Status::Critical => Self::CRITICAL,
        }
    }

    /// Unavailable values render dimmed.
    pub fn status(status: Option<Status>) -> Style {
        match status {
            Some(s) => Style::default().fg(Self::status_color(s)),
            None => Self::dim(),
        }
    }

    pub fn verdict(verdict: ProbeVerdict) -> Style {
        Self::status(verdict.status())
    }

    pub fn nav_key() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn nav_label() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn nav_active() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::CRITICAL)
    }
}
