use crate::models::{Band, ClimateRow, ProbeRow, ProbeSlot, TargetBands, Zone};
use chrono::{Duration, NaiveDateTime};
use std::fmt::Write as _;

pub const X_MIN: f64 = 50.0;
pub const X_MAX: f64 = 870.0;
pub const Y_TOP: f64 = 20.0;
pub const Y_BOTTOM: f64 = 200.0;

/// Evenly spaced label positions across the plot width.
pub const LABEL_X: [f64; 7] = [50.0, 186.67, 323.33, 460.0, 596.67, 733.33, 870.0];

const SVG_WIDTH: f64 = 920.0;
const SVG_HEIGHT: f64 = 240.0;
const LABEL_Y: f64 = 220.0;
const SERIES_COLORS: [&str; 2] = ["#2e7d32", "#1565c0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartMetric {
    Temperature,
    Humidity,
    Vpd,
    Illuminance,
    Moisture,
    Conductivity,
}

impl ChartMetric {
    pub const CLIMATE: [ChartMetric; 3] = [
        ChartMetric::Temperature,
        ChartMetric::Humidity,
        ChartMetric::Vpd,
    ];
    pub const PROBE: [ChartMetric; 3] = [
        ChartMetric::Illuminance,
        ChartMetric::Moisture,
        ChartMetric::Conductivity,
    ];
    /// Trend screen order.
    pub const ALL: [ChartMetric; 6] = [
        ChartMetric::Temperature,
        ChartMetric::Humidity,
        ChartMetric::Vpd,
        ChartMetric::Moisture,
        ChartMetric::Conductivity,
        ChartMetric::Illuminance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMetric::Temperature => "temperature",
            ChartMetric::Humidity => "humidity",
            ChartMetric::Vpd => "vpd",
            ChartMetric::Illuminance => "illuminance",
            ChartMetric::Moisture => "moisture",
            ChartMetric::Conductivity => "conductivity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "temperature" | "temp" => Some(ChartMetric::Temperature),
            "humidity" | "rh" => Some(ChartMetric::Humidity),
            "vpd" => Some(ChartMetric::Vpd),
            "illuminance" | "lux" => Some(ChartMetric::Illuminance),
            "moisture" => Some(ChartMetric::Moisture),
            "conductivity" | "cond" => Some(ChartMetric::Conductivity),
            _ => None,
        }
    }

    /// Fixed value axis `(min, max)`.
    pub fn scale(&self) -> (f64, f64) {
        match self {
            ChartMetric::Temperature => (14.0, 32.0),
            ChartMetric::Humidity => (50.0, 95.0),
            ChartMetric::Vpd => (0.0, 2.5),
            ChartMetric::Illuminance => (0.0, 30000.0),
            ChartMetric::Moisture => (0.0, 60.0),
            ChartMetric::Conductivity => (0.0, 2000.0),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ChartMetric::Temperature => "°C",
            ChartMetric::Humidity => "%",
            ChartMetric::Vpd => "kPa",
            ChartMetric::Illuminance => "lux",
            ChartMetric::Moisture => "%",
            ChartMetric::Conductivity => "µS/cm",
        }
    }

    pub fn is_probe(&self) -> bool {
        Self::PROBE.contains(self)
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            ChartMetric::Temperature => "metric_temperature",
            ChartMetric::Humidity => "metric_humidity",
            ChartMetric::Vpd => "metric_vpd",
            ChartMetric::Illuminance => "metric_illuminance",
            ChartMetric::Moisture => "metric_soil_moisture",
            ChartMetric::Conductivity => "metric_soil_conductivity",
        }
    }

    /// Policy band drawn behind the series.
    pub fn band(&self, bands: &TargetBands) -> Band {
        match self {
            ChartMetric::Temperature => bands.temperature_c,
            ChartMetric::Humidity => bands.humidity_pct,
            ChartMetric::Vpd => bands.vpd_kpa,
            ChartMetric::Illuminance => bands.illuminance_lux,
            ChartMetric::Moisture => bands.soil_moisture_pct,
            ChartMetric::Conductivity => bands.soil_conductivity_us_cm,
        }
    }

    fn climate_value(&self, row: &ClimateRow) -> Option<f64> {
        match self {
            ChartMetric::Temperature => row.temperature_c(),
            ChartMetric::Humidity => row.humidity_pct(),
            ChartMetric::Vpd => row.vpd_kpa(),
            _ => None,
        }
    }

    fn probe_value(&self, row: &ProbeRow) -> Option<f64> {
        match self {
            ChartMetric::Illuminance => row.illuminance_lux,
            ChartMetric::Moisture => row.moisture_pct,
            ChartMetric::Conductivity => row.conductivity_us_cm,
            _ => None,
        }
    }
}

impl std::fmt::Display for ChartMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeLabel {
    pub x: f64,
    pub text: String,
}

/// Rows from the 24 hours leading up to the newest timestamped row.
pub fn last_day<'a, T, F>(rows: &'a [T], timestamp: F) -> Vec<&'a T>
where
    F: Fn(&T) -> Option<NaiveDateTime>,
{
    let latest = match rows.iter().rev().find_map(&timestamp) {
        Some(ts) => ts,
        None => return Vec::new(),
    };
    let cutoff = latest - Duration::hours(24);
    rows.iter()
        .filter(|row| timestamp(*row).is_some_and(|ts| ts >= cutoff))
        .collect()
}

pub fn climate_series(rows: &[ClimateRow], zone: Zone, metric: ChartMetric) -> Vec<ChartPoint> {
    last_day(rows, |r| r.timestamp)
        .into_iter()
        .filter(|r| r.zone() == Some(zone))
        .filter_map(|r| {
            Some(ChartPoint {
                timestamp: r.timestamp?,
                value: metric.climate_value(r)?,
            })
        })
        .collect()
}

pub fn probe_series(rows: &[ProbeRow], slot: ProbeSlot, metric: ChartMetric) -> Vec<ChartPoint> {
    last_day(rows, |r| Some(r.timestamp))
        .into_iter()
        .filter(|r| r.device == slot)
        .filter_map(|r| {
            Some(ChartPoint {
                timestamp: r.timestamp,
                value: metric.probe_value(r)?,
            })
        })
        .collect()
}

fn value_to_y(value: f64, (min, max): (f64, f64)) -> f64 {
    Y_BOTTOM - (value - min) / (max - min) * (Y_BOTTOM - Y_TOP)
}

/// SVG `points` attribute, or `None` when the series spans no time or the
/// scale has no range.
pub fn polyline(points: &[ChartPoint], scale: (f64, f64)) -> Option<String> {
    let first = points.first()?.timestamp;
    let last = points.last()?.timestamp;
    let span_ms = (last - first).num_milliseconds() as f64;
    if span_ms <= 0.0 || scale.1 - scale.0 <= 0.0 {
        return None;
    }

    let coords: Vec<String> = points
        .iter()
        .map(|p| {
            let progress = (p.timestamp - first).num_milliseconds() as f64 / span_ms;
            let x = (X_MIN + progress * (X_MAX - X_MIN)).clamp(X_MIN, X_MAX);
            let y = value_to_y(p.value, scale).clamp(Y_TOP, Y_BOTTOM);
            format!("{:.1},{:.1}", x, y)
        })
        .collect();
    Some(coords.join(" "))
}

/// First and last labels are the exact end timestamps, the rest interpolate.
pub fn time_labels(points: &[ChartPoint]) -> Vec<TimeLabel> {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f.timestamp, l.timestamp),
        _ => return Vec::new(),
    };
    let span_ms = (last - first).num_milliseconds();
    let steps = (LABEL_X.len() - 1) as i64;

    LABEL_X
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let at = match i as i64 {
                0 => first,
                n if n == steps => last,
                n => first + Duration::milliseconds(span_ms * n / steps),
            };
            TimeLabel {
                x: *x,
                text: at.format("%H:%M").to_string(),
            }
        })
        .collect()
}

/// Target band as `(y, height)` on the plot, clamped to the axis.
pub fn band_rect(band: Band, scale: (f64, f64)) -> Option<(f64, f64)> {
    let (lo, hi) = (scale.0.min(scale.1), scale.0.max(scale.1));
    if hi - lo <= 0.0 {
        return None;
    }
    let top = band.max.clamp(lo, hi).max(band.min.clamp(lo, hi));
    let bottom = band.max.clamp(lo, hi).min(band.min.clamp(lo, hi));
    let y1 = value_to_y(top, (lo, hi));
    let y2 = value_to_y(bottom, (lo, hi));
    Some((y1, (y2 - y1).max(0.0)))
}

/// Standalone SVG with one line per series. Time labels follow the first series.
pub fn render_svg(
    title: &str,
    metric: ChartMetric,
    series: &[ChartSeries],
    target: Option<Band>,
) -> String {
    let scale = metric.scale();
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif" font-size="11">"#,
        w = SVG_WIDTH,
        h = SVG_HEIGHT
    );
    let _ = writeln!(svg, r#"  <title>{}</title>"#, escape(title));
    let _ = writeln!(
        svg,
        r##"  <rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none" stroke="#cccccc"/>"##,
        x = X_MIN,
        y = Y_TOP,
        w = X_MAX - X_MIN,
        h = Y_BOTTOM - Y_TOP
    );

    if let Some((y, height)) = target.and_then(|band| band_rect(band, scale)) {
        let _ = writeln!(
            svg,
            r##"  <rect x="{x}" y="{y:.2}" width="{w}" height="{height:.2}" fill="#a5d6a7" fill-opacity="0.35"/>"##,
            x = X_MIN,
            w = X_MAX - X_MIN,
        );
    }

    let _ = writeln!(
        svg,
        r#"  <text x="4" y="{:.1}">{}</text>"#,
        Y_TOP + 4.0,
        format_axis(scale.1)
    );
    let _ = writeln!(
        svg,
        r#"  <text x="4" y="{:.1}">{} {}</text>"#,
        Y_BOTTOM,
        format_axis(scale.0),
        escape(metric.unit())
    );

    for (i, s) in series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        match polyline(&s.points, scale) {
            Some(points) => {
                let _ = writeln!(
                    svg,
                    r#"  <polyline fill="none" stroke="{}" stroke-width="2" points="{}"><title>{}</title></polyline>"#,
                    color,
                    points,
                    escape(&s.label)
                );
            }
            None => tracing::debug!("Series '{}' has nothing to draw", s.label),
        }
    }

    if let Some(first) = series.first() {
        for label in time_labels(&first.points) {
            let _ = writeln!(
                svg,
                r#"  <text x="{}" y="{}" text-anchor="middle">{}</text>"#,
                label.x, LABEL_Y, label.text
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn format_axis(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
