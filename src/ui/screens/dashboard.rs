use crate::app::Screen;
use crate::i18n::{self, Locale};
use crate::models::{Classification, ClimateMetric, Policy, Status};
use crate::ui::components::GaugeWidget;
use crate::ui::screens::{render_nav, render_status_message};
use crate::ui::Theme;
use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Widget, Wrap},
};

pub struct DashboardScreen<'a> {
    pub site_name: &'a str,
    pub locale: Locale,
    pub policy: &'a Policy,
    pub greenhouse: Option<&'a Classification>,
    pub outdoor: Option<&'a Classification>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub status_message: Option<&'a str>,
    pub status_is_error: bool,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(site_name: &'a str, locale: Locale, policy: &'a Policy) -> Self {
        Self {
            site_name,
            locale,
            policy,
            greenhouse: None,
            outdoor: None,
            fetched_at: None,
            status_message: None,
            status_is_error: false,
        }
    }

    pub fn with_classifications(
        mut self,
        greenhouse: Option<&'a Classification>,
        outdoor: Option<&'a Classification>,
    ) -> Self {
        self.greenhouse = greenhouse;
        self.outdoor = outdoor;
        self
    }

    pub fn fetched_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.fetched_at = at;
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>, is_error: bool) -> Self {
        self.status_message = status;
        self.status_is_error = is_error;
        self
    }

    fn t(&self, key: &str) -> String {
        i18n::translate(self.locale, key)
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(5), // Gauges row
                Constraint::Min(8),    // Plant status and assessment
                Constraint::Length(7), // Guidance
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_gauges(chunks[1], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[2]);
        self.render_plant_status(middle[0], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(6)])
            .split(middle[1]);
        self.render_explanation(right[0], buf);
        self.render_comparison(right[1], buf);

        self.render_guidance(chunks[3], buf);
        render_status_message(chunks[4], buf, self.status_message, self.status_is_error);
        render_nav(chunks[5], buf, self.locale, Screen::Dashboard);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let mut title = vec![Span::styled(self.site_name.to_string(), Theme::title())];
        if let Some(c) = self.greenhouse {
            let phase_key = format!("phase_{}", c.phase.as_str());
            title.push(Span::styled(
                format!(
                    " · {}: {} · {}",
                    self.t("policy"),
                    c.policy_name,
                    self.t(&phase_key)
                ),
                Theme::normal(),
            ));
            if let Some(overall) = c.overall() {
                title.push(Span::styled(
                    format!(" {}", overall.symbol()),
                    Theme::status(Some(overall)),
                ));
            }
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let updated = self
            .fetched_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| self.t("loading"));
        let info = format!("{}: {}", self.t("last_updated"), updated);
        Paragraph::new(Span::styled(info, Theme::dim()))
            .block(block)
            .render(area, buf);
    }

    fn render_gauges(&self, area: Rect, buf: &mut Buffer) {
        let gauge_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        let titles: Vec<String> = ClimateMetric::ALL
            .iter()
            .map(|m| format!("{} · {}", self.t("greenhouse"), self.t(m.label_key())))
            .collect();

        for (i, metric) in ClimateMetric::ALL.iter().enumerate() {
            let assessment = self.greenhouse.and_then(|c| c.metric(*metric)).copied();
            let label = match &assessment {
                Some(a) => i18n::status_text(self.locale, metric.status_key(a)),
                None => i18n::status_text(self.locale, "unavailable"),
            };

            let (scale, band, precision) = match (metric, self.greenhouse) {
                (ClimateMetric::Temperature, c) => {
                    ((14.0, 32.0), c.map(|c| c.bands.temperature_c), 1)
                }
                (ClimateMetric::Humidity, c) => ((50.0, 95.0), c.map(|c| c.bands.humidity_pct), 0),
                (ClimateMetric::Vpd, c) => ((0.0, 2.5), c.map(|c| c.bands.vpd_kpa), 2),
            };

            let mut gauge = GaugeWidget::new(&titles[i], assessment, metric.unit())
                .range(scale)
                .precision(precision)
                .label(label);
            if let Some(band) = band {
                gauge = gauge.band(band);
            }
            gauge.render(gauge_chunks[i], buf);
        }
    }

    fn render_plant_status(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(self.t("plant_status_title"), Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let plant = match self.greenhouse.and_then(|c| c.plant) {
            Some(p) => p,
            None => {
                Paragraph::new(Span::styled(self.t("no_data"), Theme::dim())).render(inner, buf);
                return;
            }
        };

        let indicators = [
            ("status_label_growth", plant.growth_key(), plant.growth),
            (plant.stomatal_label_key(), plant.stomatal_key(), plant.stomatal),
            (plant.secondary_label_key(), plant.secondary_key(), plant.secondary),
            ("status_label_fungus", plant.fungus_key(), plant.fungus_risk),
        ];

        let items: Vec<ListItem> = indicators
            .iter()
            .map(|(label_key, value_key, status)| {
                let style = Theme::status(Some(*status));
                ListItem::new(vec![
                    Line::from(Span::styled(self.t(label_key), Theme::dim())),
                    Line::from(vec![
                        Span::styled(format!("{} ", status.symbol()), style),
                        Span::styled(i18n::status_text(self.locale, value_key), style),
                    ]),
                ])
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_explanation(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(self.t("explanation_title"), Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let (text, style) = match self.greenhouse.and_then(|c| c.plant) {
            Some(plant) => {
                let worst = Status::worst(&[
                    plant.growth,
                    plant.stomatal,
                    plant.secondary,
                    plant.fungus_risk,
                ]);
                (self.t(plant.explanation.key()), Theme::status(Some(worst)))
            }
            None => (self.t("no_data"), Theme::dim()),
        };

        Paragraph::new(Span::styled(text, style))
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_comparison(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(self.t("comparison_title"), Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let header = Row::new(vec![
            Cell::from(""),
            Cell::from(self.t("greenhouse")),
            Cell::from(self.t("outdoor")),
            Cell::from(""),
        ])
        .style(Theme::header());

        let rows: Vec<Row> = ClimateMetric::ALL
            .iter()
            .map(|metric| {
                let inside = self.greenhouse.and_then(|c| c.metric(*metric));
                let outside = self.outdoor.and_then(|c| c.metric(*metric));
                let fmt = |a: Option<&crate::models::MetricAssessment>| {
                    a.map(|a| format!("{:.1}{}", a.value, metric.unit()))
                        .unwrap_or_else(|| "-".to_string())
                };
                let outside_note = outside
                    .map(|a| i18n::status_text(self.locale, metric.side_key(a.side)))
                    .unwrap_or_default();

                Row::new(vec![
                    Cell::from(self.t(metric.label_key())),
                    Cell::from(fmt(inside)).style(Theme::status(inside.map(|a| a.status))),
                    Cell::from(fmt(outside)).style(Theme::normal()),
                    Cell::from(outside_note).style(Theme::dim()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Min(10),
        ];
        Table::new(rows, widths).header(header).render(inner, buf);
    }

    fn render_guidance(&self, area: Rect, buf: &mut Buffer) {
        let phase = self
            .greenhouse
            .map(|c| c.phase)
            .unwrap_or(crate::models::DayPhase::Day);
        let vpd = self.policy.vpd_for(phase);

        let block = Block::default()
            .title(Span::styled(
                format!(
                    "{} · {} · {} {:.2} kPa",
                    self.t("guidance_title"),
                    i18n::temperature_range_label(self.policy),
                    self.t("target"),
                    vpd.target
                ),
                Theme::header(),
            ))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let lines: Vec<Line> = i18n::policy_notes(self.locale, self.policy, phase)
            .into_iter()
            .map(|note| Line::from(vec![Span::styled("• ", Theme::dim()), Span::raw(note)]))
            .collect();

        Paragraph::new(lines)
            .style(Style::default().fg(Theme::FG))
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
