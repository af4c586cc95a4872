use super::feed::lenient_number;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeSlot {
    First,
    Second,
}

impl ProbeSlot {
    pub const ALL: [ProbeSlot; 2] = [ProbeSlot::First, ProbeSlot::Second];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeSlot::First => "first",
            ProbeSlot::Second => "second",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "first" | "1" => Some(ProbeSlot::First),
            "second" | "2" => Some(ProbeSlot::Second),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProbeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One soil probe. Every field is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub moisture_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub conductivity_us_cm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub illuminance_lux: Option<f64>,
}

impl ProbeReading {
    pub fn is_empty(&self) -> bool {
        self.moisture_pct.is_none()
            && self.conductivity_us_cm.is_none()
            && self.illuminance_lux.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbePair {
    #[serde(default)]
    pub first: ProbeReading,
    #[serde(default)]
    pub second: ProbeReading,
}

impl ProbePair {
    pub fn new(first: ProbeReading, second: ProbeReading) -> Self {
        Self { first, second }
    }

    pub fn get(&self, slot: ProbeSlot) -> &ProbeReading {
        match slot {
            ProbeSlot::First => &self.first,
            ProbeSlot::Second => &self.second,
        }
    }

    pub fn swapped(&self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }

    pub fn moisture(&self) -> [Option<f64>; 2] {
        [self.first.moisture_pct, self.second.moisture_pct]
    }

    pub fn conductivity(&self) -> [Option<f64>; 2] {
        [self.first.conductivity_us_cm, self.second.conductivity_us_cm]
    }

    pub fn illuminance(&self) -> [Option<f64>; 2] {
        [self.first.illuminance_lux, self.second.illuminance_lux]
    }
}

/// Snapshot of greenhouse conditions handed to the engine for one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub vpd_kpa: Option<f64>,
    #[serde(default)]
    pub probes: ProbePair,
}

impl Reading {
    pub fn climate(temperature_c: f64, humidity_pct: f64, vpd_kpa: f64) -> Self {
        Self {
            temperature_c: Some(temperature_c),
            humidity_pct: Some(humidity_pct),
            vpd_kpa: Some(vpd_kpa),
            probes: ProbePair::default(),
        }
    }

    pub fn with_probes(mut self, probes: ProbePair) -> Self {
        self.probes = probes;
        self
    }

    pub fn has_climate(&self) -> bool {
        self.temperature_c.is_some() || self.humidity_pct.is_some() || self.vpd_kpa.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_slot_from_str() {
        assert_eq!(ProbeSlot::from_str("first"), Some(ProbeSlot::First));
        assert_eq!(ProbeSlot::from_str(" Second "), Some(ProbeSlot::Second));
        assert_eq!(ProbeSlot::from_str("2"), Some(ProbeSlot::Second));
        assert_eq!(ProbeSlot::from_str("third"), None);
    }

    #[test]
    fn probe_pair_swap() {
        let pair = ProbePair::new(
            ProbeReading {
                moisture_pct: Some(10.0),
                ..Default::default()
            },
            ProbeReading {
                moisture_pct: Some(40.0),
                conductivity_us_cm: Some(500.0),
                ..Default::default()
            },
        );
        let swapped = pair.swapped();
        assert_eq!(swapped.moisture(), [Some(40.0), Some(10.0)]);
        assert_eq!(swapped.conductivity(), [Some(500.0), None]);
        assert_eq!(swapped.get(ProbeSlot::Second).moisture_pct, Some(10.0));
    }

    #[test]
    fn probe_reading_lenient_json() {
        let json = r#"{"moisture_pct": "22.5", "conductivity_us_cm": null, "illuminance_lux": 830}"#;
        let probe: ProbeReading = serde_json::from_str(json).unwrap();
        assert_eq!(probe.moisture_pct, Some(22.5));
        assert_eq!(probe.conductivity_us_cm, None);
        assert_eq!(probe.illuminance_lux, Some(830.0));

        let empty: ProbeReading = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn climate_constructor() {
        let reading = Reading::climate(26.0, 80.0, 0.85);
        assert!(reading.has_climate());
        assert_eq!(reading.vpd_kpa, Some(0.85));
        assert!(reading.probes.first.is_empty());
        assert!(!Reading::default().has_climate());
    }
}
