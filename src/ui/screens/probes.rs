use crate::app::Screen;
use crate::i18n::{self, Locale};
use crate::models::{Band, Classification, ProbeMetric, ProbePair, ProbeVerdict};
use crate::ui::screens::render_nav;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

pub struct ProbesScreen<'a> {
    pub locale: Locale,
    pub probes: Option<&'a ProbePair>,
    pub classification: Option<&'a Classification>,
}

impl<'a> ProbesScreen<'a> {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            probes: None,
            classification: None,
        }
    }

    pub fn with_probes(mut self, probes: Option<&'a ProbePair>) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_classification(mut self, classification: Option<&'a Classification>) -> Self {
        self.classification = classification;
        self
    }

    fn t(&self, key: &str) -> String {
        i18n::translate(self.locale, key)
    }
}

fn values(pair: &ProbePair, metric: ProbeMetric) -> [Option<f64>; 2] {
    match metric {
        ProbeMetric::Moisture => pair.moisture(),
        ProbeMetric::Conductivity => pair.conductivity(),
        ProbeMetric::Illuminance => pair.illuminance(),
    }
}

fn unit(metric: ProbeMetric) -> &'static str {
    match metric {
        ProbeMetric::Moisture => "%",
        ProbeMetric::Conductivity => " µS/cm",
        ProbeMetric::Illuminance => " lux",
    }
}

fn band_text(band: Band, metric: ProbeMetric) -> String {
    format!("{:.0}–{:.0}{}", band.min, band.max, unit(metric))
}

impl Widget for ProbesScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(7),    // Probe table
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let mut title = vec![Span::styled(self.t("tab_probes"), Theme::title())];
        if let Some(c) = self.classification {
            title.push(Span::styled(
                format!(
                    " · {} · {}",
                    c.policy_name,
                    self.t(&format!("phase_{}", c.phase.as_str()))
                ),
                Theme::dim(),
            ));
        }
        Paragraph::new(Line::from(title)).render(chunks[0], buf);

        self.render_table(chunks[1], buf);
        render_nav(chunks[2], buf, self.locale, Screen::Probes);
    }
}

impl ProbesScreen<'_> {
    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let (probes, classification) = match (self.probes, self.classification) {
            (Some(p), Some(c)) => (p, c),
            _ => {
                Paragraph::new(Span::styled(self.t("no_data"), Theme::dim())).render(inner, buf);
                return;
            }
        };

        let header = Row::new(vec![
            Cell::from(""),
            Cell::from(self.t("device_first")),
            Cell::from(self.t("device_second")),
            Cell::from(self.t("target")),
            Cell::from(""),
        ])
        .style(Theme::header());

        let rows: Vec<Row> = ProbeMetric::ALL
            .iter()
            .map(|metric| {
                let verdict = classification.probe(*metric);
                let band = match metric {
                    ProbeMetric::Moisture => classification.bands.soil_moisture_pct,
                    ProbeMetric::Conductivity => classification.bands.soil_conductivity_us_cm,
                    ProbeMetric::Illuminance => classification.bands.illuminance_lux,
                };
                let [first, second] = values(probes, *metric);
                let fmt = |v: Option<f64>| {
                    v.map(|v| format!("{:.0}{}", v, unit(*metric)))
                        .unwrap_or_else(|| "-".to_string())
                };
                let cell_style = |v: Option<f64>| match v {
                    Some(v) if !band.contains(v) => Theme::status(verdict.status()),
                    Some(_) => Theme::normal(),
                    None => Theme::dim(),
                };
                let verdict_text = match verdict {
                    ProbeVerdict::Unavailable => i18n::status_text(self.locale, "unavailable"),
                    v => v
                        .key(*metric)
                        .map(|k| i18n::status_text(self.locale, k))
                        .unwrap_or_default(),
                };

                Row::new(vec![
                    Cell::from(self.t(metric.label_key())),
                    Cell::from(fmt(first)).style(cell_style(first)),
                    Cell::from(fmt(second)).style(cell_style(second)),
                    Cell::from(band_text(band, *metric)).style(Theme::dim()),
                    Cell::from(verdict_text).style(Theme::verdict(verdict)),
                ])
                .height(2)
            })
            .collect();

        let widths = [
            Constraint::Length(28),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(20),
            Constraint::Min(16),
        ];
        Table::new(rows, widths).header(header).render(inner, buf);
    }
}
