use crate::logic::charts::{time_labels, ChartPoint};
use crate::models::Band;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
};

const EIGHTHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column bars for one 24-hour series, one column per time bucket.
pub struct TrendChart<'a> {
    title: String,
    points: &'a [ChartPoint],
    scale: (f64, f64),
    band: Option<Band>,
    color: Color,
    empty_label: String,
}

impl<'a> TrendChart<'a> {
    pub fn new(title: String, points: &'a [ChartPoint], scale: (f64, f64)) -> Self {
        Self {
            title,
            points,
            scale,
            band: None,
            color: Theme::ACCENT,
            empty_label: String::new(),
        }
    }

    pub fn band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn empty_label(mut self, label: String) -> Self {
        self.empty_label = label;
        self
    }
}

/// Last value that falls into each of `columns` equal time buckets.
pub fn bucket(points: &[ChartPoint], columns: usize) -> Vec<Option<f64>> {
    let mut buckets = vec![None; columns];
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f.timestamp, l.timestamp),
        _ => return buckets,
    };
    if columns == 0 {
        return buckets;
    }

    let span_ms = (last - first).num_milliseconds().max(1) as f64;
    for p in points {
        let progress = (p.timestamp - first).num_milliseconds() as f64 / span_ms;
        let index = ((progress * (columns - 1) as f64).round() as usize).min(columns - 1);
        buckets[index] = Some(p.value);
    }
    buckets
}

/// Bar height in eighths of a cell.
fn eighths(value: f64, (min, max): (f64, f64), rows: u16) -> u32 {
    if max - min <= 0.0 {
        return 0;
    }
    let ratio = ((value - min) / (max - min)).clamp(0.0, 1.0);
    (ratio * rows as f64 * 8.0).round() as u32
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 4 || area.width < 12 {
            return;
        }

        let block = Block::default()
            .title(Span::styled(self.title.clone(), Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        if self.points.is_empty() {
            Paragraph::new(Span::styled(self.empty_label.clone(), Theme::dim())).render(inner, buf);
            return;
        }

        // Bottom row carries the time axis.
        let plot_rows = inner.height - 1;
        let columns = bucket(self.points, inner.width as usize);
        let band_rows = self.band.map(|b| {
            (
                eighths(b.min, self.scale, plot_rows) / 8,
                eighths(b.max, self.scale, plot_rows) / 8,
            )
        });

        for (offset, value) in columns.iter().enumerate() {
            let x = inner.x + offset as u16;
            let height = value.map(|v| eighths(v, self.scale, plot_rows)).unwrap_or(0);

            for row in 0..plot_rows {
                let y = inner.y + plot_rows - 1 - row;
                let level = row as u32 * 8;
                let cell = &mut buf[(x, y)];
                if height >= level + 8 {
                    cell.set_char('█').set_fg(self.color);
                } else if height > level {
                    cell.set_char(EIGHTHS[(height - level - 1) as usize])
                        .set_fg(self.color);
                } else if let Some((lo, hi)) = band_rows {
                    if row as u32 == lo || row as u32 == hi {
                        cell.set_char('·').set_fg(Theme::DIM);
                    }
                }
            }
        }

        let axis_y = inner.y + plot_rows;
        let labels = time_labels(self.points);
        if let (Some(first), Some(last)) = (labels.first(), labels.last()) {
            buf.set_string(inner.x, axis_y, &first.text, Theme::dim());
            let last_x = inner.x + inner.width.saturating_sub(last.text.len() as u16);
            buf.set_string(last_x, axis_y, &last.text, Theme::dim());
        }
        if let Some(latest) = self.points.last() {
            let text = format!("{:.1}", latest.value);
            let mid = inner.x + (inner.width / 2).saturating_sub(text.len() as u16 / 2);
            buf.set_string(mid, axis_y, text, Style::default().fg(self.color));
        }
    }
}
