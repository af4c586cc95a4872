use crate::app::Screen;
use crate::i18n::{self, Locale};
use crate::logic::charts::{climate_series, probe_series, ChartMetric, ChartPoint};
use crate::logic::FeedSnapshot;
use crate::models::{ProbeSlot, TargetBands, Zone};
use crate::ui::components::TrendChart;
use crate::ui::screens::render_nav;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct TrendsScreen<'a> {
    pub locale: Locale,
    pub metric: ChartMetric,
    pub feed: &'a FeedSnapshot,
    pub bands: Option<&'a TargetBands>,
}

impl<'a> TrendsScreen<'a> {
    pub fn new(locale: Locale, metric: ChartMetric, feed: &'a FeedSnapshot) -> Self {
        Self {
            locale,
            metric,
            feed,
            bands: None,
        }
    }

    pub fn with_bands(mut self, bands: Option<&'a TargetBands>) -> Self {
        self.bands = bands;
        self
    }

    fn t(&self, key: &str) -> String {
        i18n::translate(self.locale, key)
    }

    /// Two panels: greenhouse/outdoor for climate, first/second for probes.
    fn panels(&self) -> [(String, Vec<ChartPoint>, Color); 2] {
        if self.metric.is_probe() {
            let series = |slot: ProbeSlot| probe_series(&self.feed.probe_history, slot, self.metric);
            [
                (
                    self.t("device_first"),
                    series(ProbeSlot::First),
                    Theme::PROBE_FIRST,
                ),
                (
                    self.t("device_second"),
                    series(ProbeSlot::Second),
                    Theme::PROBE_SECOND,
                ),
            ]
        } else {
            [
                (
                    self.t("greenhouse"),
                    climate_series(&self.feed.greenhouse_history, Zone::Greenhouse, self.metric),
                    Theme::GREENHOUSE,
                ),
                (
                    self.t("outdoor"),
                    climate_series(&self.feed.outdoor_history, Zone::Outdoor, self.metric),
                    Theme::OUTDOOR,
                ),
            ]
        }
    }
}

impl Widget for TrendsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(1), // Metric tabs
                Constraint::Min(8),    // Charts
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled(self.t("trends_title"), Theme::title()),
            Span::styled(
                format!(" · {} ({})", self.t(self.metric.label_key()), self.metric.unit()),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let mut tabs = vec![Span::styled("[←/→] ", Theme::nav_key())];
        for metric in ChartMetric::ALL {
            let style = if metric == self.metric {
                Theme::highlight()
            } else {
                Theme::nav_label()
            };
            tabs.push(Span::styled(self.t(metric.label_key()), style));
            tabs.push(Span::raw("  "));
        }
        Paragraph::new(Line::from(tabs)).render(chunks[1], buf);

        let charts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let band = self.bands.map(|b| self.metric.band(b));
        let no_data = self.t("no_data");
        for (i, (label, points, color)) in self.panels().iter().enumerate() {
            let mut chart = TrendChart::new(label.clone(), points, self.metric.scale())
                .color(*color)
                .empty_label(no_data.clone());
            // Greenhouse policy band only applies to the greenhouse and its probes.
            if let (Some(band), true) = (band, i == 0 || self.metric.is_probe()) {
                chart = chart.band(band);
            }
            chart.render(charts[i], buf);
        }

        render_nav(chunks[3], buf, self.locale, Screen::Trends);
    }
}
