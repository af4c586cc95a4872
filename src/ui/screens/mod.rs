pub mod dashboard;
pub mod probes;
pub mod trends;

pub use dashboard::DashboardScreen;
pub use probes::ProbesScreen;
pub use trends::TrendsScreen;

use crate::app::Screen;
use crate::i18n::{self, Locale};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Bottom bar: screen tabs followed by the key help.
pub fn render_nav(area: Rect, buf: &mut Buffer, locale: Locale, active: Screen) {
    let mut spans = Vec::new();
    for (i, screen) in Screen::ALL.iter().enumerate() {
        spans.push(Span::styled(format!("[{}]", i + 1), Theme::nav_key()));
        let style = if *screen == active {
            Theme::nav_active()
        } else {
            Theme::nav_label()
        };
        spans.push(Span::styled(i18n::translate(locale, screen.title_key()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("[l]", Theme::nav_key()));
    spans.push(Span::styled(
        format!("{} ", locale.toggle().as_str().to_uppercase()),
        Theme::nav_label(),
    ));
    spans.push(Span::styled("[r]", Theme::nav_key()));
    spans.push(Span::styled("↻ ", Theme::nav_label()));
    spans.push(Span::styled("[q]", Theme::nav_key()));
    spans.push(Span::styled("✕", Theme::nav_label()));

    Paragraph::new(Line::from(spans)).render(area, buf);
}

pub fn render_status_message(area: Rect, buf: &mut Buffer, message: Option<&str>, is_error: bool) {
    if let Some(msg) = message {
        let style = if is_error {
            Theme::error()
        } else {
            Theme::dim()
        };
        Paragraph::new(Span::styled(msg, style)).render(area, buf);
    }
}
