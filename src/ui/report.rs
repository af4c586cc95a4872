use crate::i18n::{self, Locale};
use crate::models::{
    Classification, ClimateMetric, ClimateRow, DayPhase, Policy, ProbeMetric, SunWindow, Zone,
};
use std::fmt::Write as _;

fn hours(h: f64) -> String {
    let minutes = (h * 60.0).round() as i64;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Plain-text classification for the `status` command.
pub fn status_report(locale: Locale, zone: Zone, c: &Classification) -> String {
    let t = |key: &str| i18n::translate(locale, key);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} · {}: {} · {}",
        t(zone.as_str()),
        t("policy"),
        c.policy_name,
        t(&format!("phase_{}", c.phase.as_str()))
    );
    if let Some(overall) = c.overall() {
        let _ = writeln!(
            out,
            "{} {}",
            overall.symbol(),
            i18n::status_text(locale, overall.as_str())
        );
    }
    out.push('\n');

    for metric in ClimateMetric::ALL {
        let band = match metric {
            ClimateMetric::Temperature => c.bands.temperature_c,
            ClimateMetric::Humidity => c.bands.humidity_pct,
            ClimateMetric::Vpd => c.bands.vpd_kpa,
        };
        let line = match c.metric(metric) {
            Some(a) => format!(
                "{} {:.2}{} {} ({}–{}{})",
                a.status.symbol(),
                a.value,
                metric.unit(),
                i18n::status_text(locale, metric.side_key(a.side)),
                band.min,
                band.max,
                metric.unit()
            ),
            None => format!("   {}", i18n::status_text(locale, "unavailable")),
        };
        let _ = writeln!(out, "{:<20} {}", t(metric.label_key()), line);
    }

    if let Some(plant) = &c.plant {
        let _ = writeln!(out, "\n{}", t("plant_status_title"));
        let indicators = [
            ("status_label_growth", plant.growth_key(), plant.growth),
            (plant.stomatal_label_key(), plant.stomatal_key(), plant.stomatal),
            (plant.secondary_label_key(), plant.secondary_key(), plant.secondary),
            ("status_label_fungus", plant.fungus_key(), plant.fungus_risk),
        ];
        for (label, value, status) in indicators {
            let _ = writeln!(
                out,
                "  {:<18} {} {}",
                t(label),
                status.symbol(),
                i18n::status_text(locale, value)
            );
        }
        let _ = writeln!(out, "\n{}", t(plant.explanation.key()));
    }

    let probes: Vec<String> = ProbeMetric::ALL
        .iter()
        .filter_map(|metric| {
            let verdict = c.probe(*metric);
            let key = verdict.key(*metric)?;
            let symbol = verdict.status().map(|s| s.symbol()).unwrap_or(" ");
            Some(format!(
                "  {:<28} {} {}",
                t(metric.label_key()),
                symbol,
                i18n::status_text(locale, key)
            ))
        })
        .collect();
    if !probes.is_empty() {
        out.push('\n');
        for line in probes {
            let _ = writeln!(out, "{}", line);
        }
    }

    out
}

/// Policy table entry with its VPD bands and sun window for the `policy` command.
pub fn policy_report(
    locale: Locale,
    policy: &Policy,
    month: u32,
    sun: SunWindow,
    phase: Option<DayPhase>,
) -> String {
    let t = |key: &str| i18n::translate(locale, key);
    let mut out = String::new();

    let _ = writeln!(out, "{}: {} (month {})", t("policy"), policy.name, month);
    let _ = writeln!(
        out,
        "  {:<26} {}",
        t("metric_temperature"),
        i18n::temperature_range_label(policy)
    );
    let _ = writeln!(
        out,
        "  {:<26} {}–{}%",
        t("metric_humidity"),
        policy.humidity_pct.min,
        policy.humidity_pct.max
    );
    for p in [DayPhase::Day, DayPhase::Night] {
        let vpd = policy.vpd_for(p);
        let band = vpd.band();
        let marker = if phase == Some(p) { " ◀" } else { "" };
        let _ = writeln!(
            out,
            "  {:<26} {:.2} ± {:.2} kPa ({:.2}–{:.2}){}",
            format!("VPD {}", t(&format!("phase_{}", p.as_str()))),
            vpd.target,
            vpd.tolerance,
            band.min,
            band.max,
            marker
        );
    }
    let _ = writeln!(
        out,
        "  {:<26} {}–{}%",
        t("metric_soil_moisture"),
        policy.soil_moisture_pct.min,
        policy.soil_moisture_pct.max
    );
    let _ = writeln!(
        out,
        "  {:<26} {}–{} µS/cm",
        t("metric_soil_conductivity"),
        policy.soil_conductivity_us_cm.min,
        policy.soil_conductivity_us_cm.max
    );
    let _ = writeln!(
        out,
        "  {:<26} {}–{} lux / ≤ {} lux",
        t("metric_illuminance"),
        policy.illuminance_lux.min,
        policy.illuminance_lux.max,
        policy.night_illuminance_max()
    );
    let _ = writeln!(out, "  ☀ {} – {}", hours(sun.sunrise), hours(sun.sunset));

    let _ = writeln!(out, "\n{}", t("guidance_title"));
    for note in i18n::policy_notes(locale, policy, phase.unwrap_or(DayPhase::Day)) {
        let _ = writeln!(out, "  • {}", note);
    }

    out
}

/// Filtered history rows followed by the status of the newest one.
pub fn table_report(
    locale: Locale,
    rows: &[&ClimateRow],
    latest: Option<&Classification>,
) -> String {
    let t = |key: &str| i18n::translate(locale, key);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<20} {:<11} {:>7} {:>7} {:>6} {:>7}",
        "timestamp",
        "location",
        "°C",
        "%",
        "kPa",
        "dew °C"
    );
    for row in rows {
        let v = &row.values;
        let _ = writeln!(
            out,
            "{:<20} {:<11} {:>7} {:>7} {:>6} {:>7}",
            v[0], v[1], v[2], v[3], v[4], v[5]
        );
    }

    if let Some(c) = latest {
        let _ = writeln!(out);
        let parts: Vec<String> = ClimateMetric::ALL
            .iter()
            .map(|metric| {
                let text = c
                    .metric(*metric)
                    .map(|a| {
                        format!(
                            "{} {}",
                            a.status.symbol(),
                            i18n::status_text(locale, metric.status_key(a))
                        )
                    })
                    .unwrap_or_else(|| i18n::status_text(locale, "unavailable"));
                format!("{}: {}", t(metric.label_key()), text)
            })
            .collect();
        let _ = writeln!(out, "{}", parts.join(" | "));
    }

    out
}
