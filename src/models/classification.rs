use super::policy::Band;
use super::sun::DayPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-tier severity. Ordering runs from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Good,
    Caution,
    Critical,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "good",
            Status::Caution => "caution",
            Status::Critical => "critical",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Good => "🟢",
            Status::Caution => "🟡",
            Status::Critical => "🔴",
        }
    }

    pub fn worst(statuses: &[Status]) -> Status {
        statuses.iter().copied().max().unwrap_or(Status::Good)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a value relative to its target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Below,
    Within,
    Above,
}

impl Side {
    pub fn arrow(&self) -> &'static str {
        match self {
            Side::Below => "↓",
            Side::Within => "✓",
            Side::Above => "↑",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricAssessment {
    pub value: f64,
    pub status: Status,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateMetric {
    Temperature,
    Humidity,
    Vpd,
}

impl ClimateMetric {
    pub const ALL: [ClimateMetric; 3] = [
        ClimateMetric::Temperature,
        ClimateMetric::Humidity,
        ClimateMetric::Vpd,
    ];

    pub fn label_key(&self) -> &'static str {
        match self {
            ClimateMetric::Temperature => "metric_temperature",
            ClimateMetric::Humidity => "metric_humidity",
            ClimateMetric::Vpd => "metric_vpd",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ClimateMetric::Temperature => "°C",
            ClimateMetric::Humidity => "%",
            ClimateMetric::Vpd => " kPa",
        }
    }

    /// Gauge label: the good key when in band, otherwise the severity.
    pub fn status_key(&self, assessment: &MetricAssessment) -> &'static str {
        match assessment.status {
            Status::Good => self.good_key(),
            other => other.as_str(),
        }
    }

    /// Gauge label key: temperature and humidity read "optimal", VPD reads "ideal".
    pub fn good_key(&self) -> &'static str {
        match self {
            ClimateMetric::Temperature | ClimateMetric::Humidity => "optimal",
            ClimateMetric::Vpd => "ideal",
        }
    }

    /// Key describing a value outside the band, as shown for outdoor comparisons.
    pub fn side_key(&self, side: Side) -> &'static str {
        match (self, side) {
            (_, Side::Within) => "within_policy",
            (ClimateMetric::Temperature, Side::Below) => "below_min",
            (ClimateMetric::Temperature, Side::Above) => "above_max",
            (ClimateMetric::Humidity, Side::Below) => "too_dry",
            (ClimateMetric::Humidity, Side::Above) => "too_humid",
            (ClimateMetric::Vpd, Side::Below) => "too_low",
            (ClimateMetric::Vpd, Side::Above) => "too_high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMetric {
    Moisture,
    Conductivity,
    Illuminance,
}

impl ProbeMetric {
    pub const ALL: [ProbeMetric; 3] = [
        ProbeMetric::Moisture,
        ProbeMetric::Conductivity,
        ProbeMetric::Illuminance,
    ];

    pub fn label_key(&self) -> &'static str {
        match self {
            ProbeMetric::Moisture => "metric_soil_moisture",
            ProbeMetric::Conductivity => "metric_soil_conductivity",
            ProbeMetric::Illuminance => "metric_illuminance",
        }
    }

    pub fn low_key(&self) -> &'static str {
        match self {
            ProbeMetric::Moisture => "too_dry",
            ProbeMetric::Conductivity => "cond_low",
            ProbeMetric::Illuminance => "too_dark",
        }
    }

    pub fn high_key(&self) -> &'static str {
        match self {
            ProbeMetric::Moisture => "too_wet",
            ProbeMetric::Conductivity => "cond_high",
            ProbeMetric::Illuminance => "too_bright",
        }
    }
}

/// Composite verdict over the two soil probes for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "status", rename_all = "snake_case")]
pub enum ProbeVerdict {
    /// Neither probe delivered a finite value.
    Unavailable,
    WithinPolicy,
    Low(Status),
    High(Status),
    /// One probe reads low while the other reads high.
    Mixed,
}

impl ProbeVerdict {
    pub fn status(&self) -> Option<Status> {
        match self {
            ProbeVerdict::Unavailable => None,
            ProbeVerdict::WithinPolicy => Some(Status::Good),
            ProbeVerdict::Low(s) | ProbeVerdict::High(s) => Some(*s),
            ProbeVerdict::Mixed => Some(Status::Critical),
        }
    }

    pub fn key(&self, metric: ProbeMetric) -> Option<&'static str> {
        match self {
            ProbeVerdict::Unavailable => None,
            ProbeVerdict::WithinPolicy => Some("within_policy"),
            ProbeVerdict::Low(_) => Some(metric.low_key()),
            ProbeVerdict::High(_) => Some(metric.high_key()),
            ProbeVerdict::Mixed => Some("mixed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeVerdicts {
    pub moisture: ProbeVerdict,
    pub conductivity: ProbeVerdict,
    pub illuminance: ProbeVerdict,
}

/// Narrative chosen from the worst composite indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Explanation {
    AllOptimal,
    TempCritical,
    TranspirationCritical,
    MoistureCritical,
    TempWarning,
    TranspirationWarning,
    TranspirationWarningHighHumidity,
    MoistureWarning,
}

impl Explanation {
    pub fn key(&self) -> &'static str {
        match self {
            Explanation::AllOptimal => "explanation_all_optimal",
            Explanation::TempCritical => "explanation_temp_critical",
            Explanation::TranspirationCritical => "explanation_trans_critical",
            Explanation::MoistureCritical => "explanation_moisture_critical",
            Explanation::TempWarning => "explanation_temp_warning",
            Explanation::TranspirationWarning => "explanation_trans_warning",
            Explanation::TranspirationWarningHighHumidity => "explanation_trans_warning_high_hum",
            Explanation::MoistureWarning => "explanation_moisture_warning",
        }
    }
}

/// CAM-aware plant indicators.
///
/// `stomatal` is photosynthesis by day and CO2 uptake by night. `secondary`
/// is excess-moisture risk by day and limited transpiration by night.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantStatus {
    pub phase: DayPhase,
    pub growth: Status,
    pub stomatal: Status,
    pub secondary: Status,
    pub fungus_risk: Status,
    pub explanation: Explanation,
}

impl PlantStatus {
    pub fn growth_key(&self) -> &'static str {
        match self.growth {
            Status::Good => "status_growth_optimal",
            Status::Caution => "status_growth_caution",
            Status::Critical => "status_growth_critical",
        }
    }

    pub fn stomatal_label_key(&self) -> &'static str {
        match self.phase {
            DayPhase::Day => "status_label_photosynthesis",
            DayPhase::Night => "status_label_co2_uptake",
        }
    }

    pub fn stomatal_key(&self) -> &'static str {
        match (self.phase, self.stomatal) {
            (DayPhase::Day, Status::Good) => "vpd_day_photo_optimal",
            (DayPhase::Day, _) => "vpd_day_photo_limited",
            (DayPhase::Night, Status::Good) => "vpd_night_co2_optimal",
            (DayPhase::Night, _) => "vpd_night_co2_limited",
        }
    }

    pub fn secondary_label_key(&self) -> &'static str {
        match self.phase {
            DayPhase::Day => "status_label_moisture",
            DayPhase::Night => "status_label_transpiration",
        }
    }

    pub fn secondary_key(&self) -> &'static str {
        match (self.phase, self.secondary) {
            (_, Status::Good) => "status_fungus_low",
            (DayPhase::Day, _) => "vpd_day_excess_moisture",
            (DayPhase::Night, _) => "vpd_night_trans_limited",
        }
    }

    pub fn fungus_key(&self) -> &'static str {
        match self.fungus_risk {
            Status::Good => "status_fungus_low",
            Status::Caution => "status_fungus_elevated",
            Status::Critical => "status_fungus_high",
        }
    }
}

/// Bands in force for this evaluation, for range labels next to values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBands {
    pub temperature_c: Band,
    pub humidity_pct: Band,
    pub vpd_kpa: Band,
    pub vpd_target_kpa: f64,
    pub soil_moisture_pct: Band,
    pub soil_conductivity_us_cm: Band,
    pub illuminance_lux: Band,
}

/// Result of one evaluation. `None` metrics were unavailable (absent or non-finite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub evaluated_at: DateTime<Utc>,
    pub policy_name: String,
    pub phase: DayPhase,
    pub bands: TargetBands,
    pub temperature: Option<MetricAssessment>,
    pub humidity: Option<MetricAssessment>,
    pub vpd: Option<MetricAssessment>,
    pub plant: Option<PlantStatus>,
    pub probes: ProbeVerdicts,
}

impl Classification {
    pub fn metric(&self, metric: ClimateMetric) -> Option<&MetricAssessment> {
        match metric {
            ClimateMetric::Temperature => self.temperature.as_ref(),
            ClimateMetric::Humidity => self.humidity.as_ref(),
            ClimateMetric::Vpd => self.vpd.as_ref(),
        }
    }

    pub fn probe(&self, metric: ProbeMetric) -> ProbeVerdict {
        match metric {
            ProbeMetric::Moisture => self.probes.moisture,
            ProbeMetric::Conductivity => self.probes.conductivity,
            ProbeMetric::Illuminance => self.probes.illuminance,
        }
    }

    /// Worst severity across every available indicator.
    pub fn overall(&self) -> Option<Status> {
        let mut statuses: Vec<Status> = [self.temperature, self.humidity, self.vpd]
            .iter()
            .flatten()
            .map(|m| m.status)
            .collect();
        if let Some(plant) = &self.plant {
            statuses.extend([plant.stomatal, plant.secondary, plant.fungus_risk]);
        }
        statuses.extend(
            [
                self.probes.moisture,
                self.probes.conductivity,
                self.probes.illuminance,
            ]
            .iter()
            .filter_map(|v| v.status()),
        );

        if statuses.is_empty() {
            None
        } else {
            Some(Status::worst(&statuses))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering() {
        assert!(Status::Good < Status::Caution);
        assert!(Status::Caution < Status::Critical);
        assert_eq!(
            Status::worst(&[Status::Good, Status::Critical, Status::Caution]),
            Status::Critical
        );
        assert_eq!(Status::worst(&[]), Status::Good);
    }

    #[test]
    fn probe_verdict_keys() {
        assert_eq!(ProbeVerdict::Unavailable.status(), None);
        assert_eq!(ProbeVerdict::Unavailable.key(ProbeMetric::Moisture), None);
        assert_eq!(ProbeVerdict::Mixed.status(), Some(Status::Critical));
        assert_eq!(
            ProbeVerdict::Low(Status::Caution).key(ProbeMetric::Moisture),
            Some("too_dry")
        );
        assert_eq!(
            ProbeVerdict::High(Status::Critical).key(ProbeMetric::Conductivity),
            Some("cond_high")
        );
        assert_eq!(
            ProbeVerdict::Low(Status::Critical).key(ProbeMetric::Illuminance),
            Some("too_dark")
        );
        assert_eq!(
            ProbeVerdict::WithinPolicy.key(ProbeMetric::Illuminance),
            Some("within_policy")
        );
    }

    #[test]
    fn plant_status_keys_follow_phase() {
        let mut plant = PlantStatus {
            phase: DayPhase::Day,
            growth: Status::Good,
            stomatal: Status::Caution,
            secondary: Status::Critical,
            fungus_risk: Status::Good,
            explanation: Explanation::TranspirationCritical,
        };
        assert_eq!(plant.stomatal_label_key(), "status_label_photosynthesis");
        assert_eq!(plant.stomatal_key(), "vpd_day_photo_limited");
        assert_eq!(plant.secondary_key(), "vpd_day_excess_moisture");

        plant.phase = DayPhase::Night;
        assert_eq!(plant.stomatal_label_key(), "status_label_co2_uptake");
        assert_eq!(plant.stomatal_key(), "vpd_night_co2_limited");
        assert_eq!(plant.secondary_label_key(), "status_label_transpiration");
        assert_eq!(plant.secondary_key(), "vpd_night_trans_limited");

        plant.secondary = Status::Good;
        assert_eq!(plant.secondary_key(), "status_fungus_low");
    }

    #[test]
    fn probe_verdict_serializes_with_tag() {
        let json = serde_json::to_string(&ProbeVerdict::Low(Status::Caution)).unwrap();
        assert_eq!(json, r#"{"verdict":"low","status":"caution"}"#);
        let json = serde_json::to_string(&ProbeVerdict::Mixed).unwrap();
        assert_eq!(json, r#"{"verdict":"mixed"}"#);
    }
}
