use crate::models::{Band, MetricAssessment};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Boxed reading with a status label, a fill bar over the chart scale and the
/// policy band marked underneath.
pub struct GaugeWidget<'a> {
    title: &'a str,
    assessment: Option<MetricAssessment>,
    label: String,
    unit: &'a str,
    min: f64,
    max: f64,
    band: Option<Band>,
    precision: usize,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, assessment: Option<MetricAssessment>, unit: &'a str) -> Self {
        Self {
            title,
            assessment,
            label: String::new(),
            unit,
            min: 0.0,
            max: 100.0,
            band: None,
            precision: 1,
        }
    }

    pub fn range(mut self, (min, max): (f64, f64)) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn band(mut self, band: Band) -> Self {
        self.band = Some(band);
        self
    }

    pub fn label(mut self, label: String) -> Self {
        self.label = label;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn column(&self, value: f64, width: u16) -> u16 {
        let span = self.max - self.min;
        if span <= 0.0 || width == 0 {
            return 0;
        }
        let ratio = ((value - self.min) / span).clamp(0.0, 1.0);
        ((width - 1) as f64 * ratio).round() as u16
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let assessment = match self.assessment {
            Some(a) => a,
            None => {
                Paragraph::new(Span::styled(self.label.clone(), Theme::dim())).render(inner, buf);
                return;
            }
        };

        let color = Theme::status_color(assessment.status);
        let value_line = Line::from(vec![
            Span::styled(
                format!(
                    "{:.prec$}{} ",
                    assessment.value,
                    self.unit,
                    prec = self.precision
                ),
                Style::default().fg(color),
            ),
            Span::styled(
                format!("{} {}", assessment.side.arrow(), self.label),
                Style::default().fg(color),
            ),
        ]);
        Paragraph::new(value_line).render(inner, buf);

        if inner.height >= 2 {
            let y = inner.y + 1;
            let filled = self.column(assessment.value, inner.width);
            for offset in 0..inner.width {
                let ch = if offset <= filled { '█' } else { '░' };
                buf[(inner.x + offset, y)].set_char(ch).set_fg(color);
            }
        }

        if let (Some(band), true) = (self.band, inner.height >= 3) {
            let y = inner.y + 2;
            let lo = self.column(band.min, inner.width);
            let hi = self.column(band.max, inner.width);
            for offset in lo..=hi.min(inner.width.saturating_sub(1)) {
                let ch = if offset == lo || offset == hi { '|' } else { '─' };
                buf[(inner.x + offset, y)].set_char(ch).set_fg(Theme::DIM);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, Status};

    fn render(gauge: GaugeWidget<'_>, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        gauge.render(area, &mut buf);
        buf
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn renders_value_and_band() {
        let assessment = MetricAssessment {
            value: 24.0,
            status: Status::Good,
            side: Side::Within,
        };
        let gauge = GaugeWidget::new("Temp", Some(assessment), "°C")
            .range((14.0, 32.0))
            .band(Band::new(22.0, 30.0))
            .label("Optimal".into());
        let buf = render(gauge, 30, 5);

        assert!(row(&buf, 1).contains("24.0°C"));
        assert!(row(&buf, 1).contains("Optimal"));
        assert!(row(&buf, 2).contains('█'));
        assert!(row(&buf, 3).contains('|'));
        assert_eq!(buf[(1, 1)].fg, Theme::GOOD);
    }

    #[test]
    fn unavailable_shows_label_only() {
        let gauge = GaugeWidget::new("VPD", None, " kPa").label("Unavailable".into());
        let buf = render(gauge, 20, 4);
        assert!(row(&buf, 1).contains("Unavailable"));
        assert!(!row(&buf, 2).contains('█'));
    }
}
