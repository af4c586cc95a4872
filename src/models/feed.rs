use super::reading::{ProbePair, ProbeSlot, Reading};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Where a climate row was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Greenhouse,
    Outdoor,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Greenhouse => "greenhouse",
            Zone::Outdoor => "outdoor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "greenhouse" | "inside" => Some(Zone::Greenhouse),
            "outdoor" | "outside" => Some(Zone::Outdoor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts numbers, numeric strings and null. Anything non-finite is absent.
pub fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrText> = Option::deserialize(deserializer)?;
    let value = match raw {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateSnapshot {
    #[serde(default, deserialize_with = "lenient_number")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub vpd: Option<f64>,
}

/// Contents of `latest_results.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestResults {
    #[serde(default)]
    pub greenhouse: Option<ClimateSnapshot>,
    #[serde(default)]
    pub outdoor: Option<ClimateSnapshot>,
    #[serde(default)]
    pub miflora: Option<ProbePair>,
}

impl LatestResults {
    /// Probes sit inside the greenhouse, so only that zone carries them.
    pub fn reading(&self, zone: Zone) -> Option<Reading> {
        let snapshot = match zone {
            Zone::Greenhouse => self.greenhouse.as_ref(),
            Zone::Outdoor => self.outdoor.as_ref(),
        };
        let probes = match zone {
            Zone::Greenhouse => self.miflora.unwrap_or_default(),
            Zone::Outdoor => ProbePair::default(),
        };

        match snapshot {
            Some(s) => Some(Reading {
                temperature_c: s.temp,
                humidity_pct: s.humidity,
                vpd_kpa: s.vpd,
                probes,
            }),
            None if zone == Zone::Greenhouse && self.miflora.is_some() => Some(Reading {
                probes,
                ..Default::default()
            }),
            None => None,
        }
    }
}

/// One normalized climate CSV row:
/// `timestamp, location, temperature, humidity, vpd, dew_point`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRow {
    pub values: [String; 6],
    pub timestamp: Option<NaiveDateTime>,
}

impl ClimateRow {
    pub fn timestamp_text(&self) -> &str {
        &self.values[0]
    }

    pub fn location(&self) -> &str {
        &self.values[1]
    }

    pub fn zone(&self) -> Option<Zone> {
        Zone::from_str(self.location())
    }

    pub fn temperature_c(&self) -> Option<f64> {
        parse_field(&self.values[2])
    }

    pub fn humidity_pct(&self) -> Option<f64> {
        parse_field(&self.values[3])
    }

    pub fn vpd_kpa(&self) -> Option<f64> {
        parse_field(&self.values[4])
    }

    pub fn dew_point_c(&self) -> Option<f64> {
        parse_field(&self.values[5])
    }

    pub fn to_reading(&self) -> Reading {
        Reading {
            temperature_c: self.temperature_c(),
            humidity_pct: self.humidity_pct(),
            vpd_kpa: self.vpd_kpa(),
            probes: ProbePair::default(),
        }
    }
}

/// One probe packet row:
/// `timestamp, device, temperature_c, illuminance_lux, moisture_pct, conductivity_us_cm`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRow {
    pub timestamp_text: String,
    pub timestamp: NaiveDateTime,
    pub device: ProbeSlot,
    pub temperature_c: Option<f64>,
    pub illuminance_lux: Option<f64>,
    pub moisture_pct: Option<f64>,
    pub conductivity_us_cm: Option<f64>,
}

pub fn parse_field(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
