use super::classification::Side;
use super::sun::DayPhase;
use crate::error::{Result, VanillaOpsError};
use chrono::Month;
use serde::{Deserialize, Serialize};

/// Phase used when no policy claims a month.
pub const DEFAULT_POLICY: &str = "Dormancy";

/// Inclusive `[min, max]` target band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn side(&self, value: f64) -> Side {
        if value < self.min {
            Side::Below
        } else if value > self.max {
            Side::Above
        } else {
            Side::Within
        }
    }

    /// Distance to the nearest bound, zero inside the band.
    pub fn distance(&self, value: f64) -> f64 {
        match self.side(value) {
            Side::Below => self.min - value,
            Side::Above => value - self.max,
            Side::Within => 0.0,
        }
    }

    fn validate(&self, policy: &str, field: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(policy, format!("{} bounds must be finite", field)));
        }
        if self.min > self.max {
            return Err(invalid(
                policy,
                format!("{} min {} exceeds max {}", field, self.min, self.max),
            ));
        }
        Ok(())
    }
}

const VPD_RESOLUTION: f64 = 1e6;

fn snap(value: f64) -> f64 {
    (value * VPD_RESOLUTION).round() / VPD_RESOLUTION
}

/// VPD set point with its symmetric tolerance, both in kPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VpdTarget {
    pub target: f64,
    pub tolerance: f64,
}

impl VpdTarget {
    pub const fn new(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }

    /// Edges are snapped to 1e-6 kPa so `0.8 - 0.2` compares equal to a
    /// feed value of `0.6`.
    pub fn band(&self) -> Band {
        Band::new(
            snap(self.target - self.tolerance),
            snap(self.target + self.tolerance),
        )
    }

    /// Distance beyond the band below which a reading is only a caution.
    pub fn caution_margin(&self) -> f64 {
        self.tolerance * 1.5
    }

    fn validate(&self, policy: &str, field: &str) -> Result<()> {
        if !self.target.is_finite() || !self.tolerance.is_finite() {
            return Err(invalid(policy, format!("{} must be finite", field)));
        }
        if self.tolerance <= 0.0 {
            return Err(invalid(policy, format!("{} tolerance must be positive", field)));
        }
        Ok(())
    }
}

/// Target environment for one cultivation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub months: Vec<u32>,
    pub temperature_c: Band,
    pub humidity_pct: Band,
    pub day_vpd: VpdTarget,
    pub night_vpd: VpdTarget,
    pub soil_moisture_pct: Band,
    pub soil_conductivity_us_cm: Band,
    pub illuminance_lux: Band,
}

impl Policy {
    pub fn applies_to(&self, month: Month) -> bool {
        self.months.contains(&month.number_from_month())
    }

    pub fn vpd_for(&self, phase: DayPhase) -> VpdTarget {
        match phase {
            DayPhase::Day => self.day_vpd,
            DayPhase::Night => self.night_vpd,
        }
    }

    /// Night allows a small amount of ambient light rather than full darkness.
    pub fn night_illuminance_max(&self) -> f64 {
        (self.illuminance_lux.min * 0.10).round().max(50.0)
    }

    /// Illuminance is the only band whose shape changes between day and night.
    pub fn illuminance_for(&self, phase: DayPhase) -> Band {
        match phase {
            DayPhase::Day => self.illuminance_lux,
            DayPhase::Night => Band::new(0.0, self.night_illuminance_max()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("<unnamed>", "name must not be empty".into()));
        }
        if self.months.is_empty() {
            return Err(invalid(&self.name, "at least one month is required".into()));
        }
        if let Some(m) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(invalid(&self.name, format!("month {} is outside 1-12", m)));
        }

        self.temperature_c.validate(&self.name, "temperature_c")?;
        self.humidity_pct.validate(&self.name, "humidity_pct")?;
        self.day_vpd.validate(&self.name, "day_vpd")?;
        self.night_vpd.validate(&self.name, "night_vpd")?;
        self.soil_moisture_pct.validate(&self.name, "soil_moisture_pct")?;
        self.soil_conductivity_us_cm
            .validate(&self.name, "soil_conductivity_us_cm")?;
        self.illuminance_lux.validate(&self.name, "illuminance_lux")?;
        Ok(())
    }
}

fn invalid(name: &str, reason: String) -> VanillaOpsError {
    VanillaOpsError::InvalidPolicy {
        name: name.to_string(),
        reason,
    }
}

/// Month-indexed policy table. Construction guarantees every month maps to
/// exactly one policy and that the default phase exists.
#[derive(Debug, Clone)]
pub struct PolicyCatalog {
    policies: Vec<Policy>,
    default_index: usize,
}

impl PolicyCatalog {
    pub fn new(policies: Vec<Policy>) -> Result<Self> {
        for policy in &policies {
            policy.validate()?;
        }

        for (i, policy) in policies.iter().enumerate() {
            if policies[..i].iter().any(|p| p.name == policy.name) {
                return Err(VanillaOpsError::Config(format!(
                    "policy '{}' is declared twice",
                    policy.name
                )));
            }
        }

        for month in 1..=12u32 {
            let owners: Vec<&str> = policies
                .iter()
                .filter(|p| p.months.contains(&month))
                .map(|p| p.name.as_str())
                .collect();
            match owners.len() {
                0 => {
                    return Err(VanillaOpsError::Config(format!(
                        "no policy covers month {}",
                        month
                    )))
                }
                1 => {}
                _ => {
                    return Err(VanillaOpsError::Config(format!(
                        "month {} is claimed by several policies: {}",
                        month,
                        owners.join(", ")
                    )))
                }
            }
        }

        let default_index = policies
            .iter()
            .position(|p| p.name == DEFAULT_POLICY)
            .ok_or_else(|| {
                VanillaOpsError::Config(format!(
                    "policy table must define the default '{}' phase",
                    DEFAULT_POLICY
                ))
            })?;

        Ok(Self {
            policies,
            default_index,
        })
    }

    /// Vanilla cultivation phases for the Azores greenhouse.
    pub fn builtin() -> Self {
        let policies = vec![
            phase(DEFAULT_POLICY, &[12, 1, 2], (18.0, 24.0), (65.0, 75.0), (0.7, 0.2), (0.5, 0.1)),
            phase("Awakening", &[3], (19.0, 27.0), (65.0, 80.0), (0.8, 0.2), (0.6, 0.1)),
            phase("Stress", &[4], (19.0, 27.0), (65.0, 80.0), (0.8, 0.2), (0.6, 0.1)),
            phase("Flowering", &[5, 6, 7], (22.0, 30.0), (75.0, 85.0), (0.8, 0.2), (0.5, 0.1)),
            phase("Maturation", &[8, 9], (23.0, 31.0), (70.0, 85.0), (1.1, 0.15), (0.7, 0.1)),
            phase("Hardening", &[10, 11], (20.0, 26.0), (65.0, 80.0), (0.8, 0.2), (0.6, 0.1)),
        ];

        Self {
            policies,
            default_index: 0,
        }
    }

    pub fn resolve(&self, month: Month) -> &Policy {
        match self.policies.iter().find(|p| p.applies_to(month)) {
            Some(policy) => policy,
            None => {
                // Construction rejects gapped tables, so this means the invariant broke.
                tracing::error!(
                    "No policy covers {:?}; falling back to {}",
                    month,
                    DEFAULT_POLICY
                );
                self.default_policy()
            }
        }
    }

    pub fn resolve_number(&self, month: u32) -> Result<&Policy> {
        Ok(self.resolve(month_from_number(month)?))
    }

    pub fn default_policy(&self) -> &Policy {
        &self.policies[self.default_index]
    }

    pub fn get(&self, name: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }
}

impl Default for PolicyCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn month_from_number(month: u32) -> Result<Month> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or(VanillaOpsError::InvalidMonth(month))
}

// Probe targets are provisional and shared by every phase until calibrated
// against the substrate and sensor placement.
const SOIL_MOISTURE_PCT: Band = Band::new(15.0, 35.0);
const SOIL_CONDUCTIVITY_US_CM: Band = Band::new(200.0, 900.0);
const ILLUMINANCE_LUX: Band = Band::new(5000.0, 20000.0);

fn phase(
    name: &str,
    months: &[u32],
    temperature: (f64, f64),
    humidity: (f64, f64),
    day_vpd: (f64, f64),
    night_vpd: (f64, f64),
) -> Policy {
    Policy {
        name: name.to_string(),
        months: months.to_vec(),
        temperature_c: Band::new(temperature.0, temperature.1),
        humidity_pct: Band::new(humidity.0, humidity.1),
        day_vpd: VpdTarget::new(day_vpd.0, day_vpd.1),
        night_vpd: VpdTarget::new(night_vpd.0, night_vpd.1),
        soil_moisture_pct: SOIL_MOISTURE_PCT,
        soil_conductivity_us_cm: SOIL_CONDUCTIVITY_US_CM,
        illuminance_lux: ILLUMINANCE_LUX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vpd_band_edges_snap_to_published_values() {
        let band = VpdTarget::new(0.8, 0.2).band();
        assert_eq!((band.min, band.max), (0.6, 1.0));
        let band = VpdTarget::new(1.1, 0.15).band();
        assert_eq!((band.min, band.max), (0.95, 1.25));
        let band = VpdTarget::new(0.7, 0.1).band();
        assert_eq!((band.min, band.max), (0.6, 0.8));
        let band = VpdTarget::new(0.7, 0.2).band();
        assert_eq!(band.max, 0.9);
    }

    #[test]
    fn builtin_catalog_is_total() {
        let builtin = PolicyCatalog::builtin();
        // Re-running the checked constructor proves the table has no gaps or overlaps
        let checked = PolicyCatalog::new(builtin.policies().to_vec());
        assert!(checked.is_ok());
    }

    #[test]
    fn resolve_by_month() {
        let catalog = PolicyCatalog::builtin();
        assert_eq!(catalog.resolve(Month::January).name, "Dormancy");
        assert_eq!(catalog.resolve(Month::December).name, "Dormancy");
        assert_eq!(catalog.resolve(Month::March).name, "Awakening");
        assert_eq!(catalog.resolve(Month::April).name, "Stress");
        assert_eq!(catalog.resolve(Month::June).name, "Flowering");
        assert_eq!(catalog.resolve(Month::September).name, "Maturation");
        assert_eq!(catalog.resolve(Month::November).name, "Hardening");
    }

    #[test]
    fn resolve_number_rejects_out_of_domain() {
        let catalog = PolicyCatalog::builtin();
        assert!(matches!(
            catalog.resolve_number(0),
            Err(VanillaOpsError::InvalidMonth(0))
        ));
        assert!(matches!(
            catalog.resolve_number(13),
            Err(VanillaOpsError::InvalidMonth(13))
        ));
        assert_eq!(catalog.resolve_number(8).unwrap().name, "Maturation");
    }

    #[test]
    fn catalog_rejects_gaps() {
        let mut policies = PolicyCatalog::builtin().policies().to_vec();
        policies.retain(|p| p.name != "Stress");
        let err = PolicyCatalog::new(policies).unwrap_err();
        assert!(err.to_string().contains("month 4"));
    }

    #[test]
    fn catalog_rejects_overlaps() {
        let mut policies = PolicyCatalog::builtin().policies().to_vec();
        policies[1].months.push(4);
        let err = PolicyCatalog::new(policies).unwrap_err();
        assert!(err.to_string().contains("several policies"));
    }

    #[test]
    fn catalog_requires_default_phase() {
        let mut policies = PolicyCatalog::builtin().policies().to_vec();
        policies[0].name = "Rest".into();
        let err = PolicyCatalog::new(policies).unwrap_err();
        assert!(err.to_string().contains(DEFAULT_POLICY));
    }

    #[test]
    fn malformed_policy_is_rejected() {
        let mut policies = PolicyCatalog::builtin().policies().to_vec();
        policies[3].temperature_c = Band::new(30.0, 22.0);
        assert!(matches!(
            PolicyCatalog::new(policies.clone()),
            Err(VanillaOpsError::InvalidPolicy { .. })
        ));

        policies[3].temperature_c = Band::new(22.0, 30.0);
        policies[3].night_vpd = VpdTarget::new(0.5, 0.0);
        assert!(matches!(
            PolicyCatalog::new(policies),
            Err(VanillaOpsError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn night_illuminance_band() {
        let catalog = PolicyCatalog::builtin();
        let policy = catalog.resolve(Month::June);
        assert_eq!(policy.night_illuminance_max(), 500.0);

        let night = policy.illuminance_for(DayPhase::Night);
        assert_eq!(night, Band::new(0.0, 500.0));
        assert_eq!(policy.illuminance_for(DayPhase::Day), policy.illuminance_lux);

        // Dim day targets still leave at least 50 lux at night
        let mut dim = policy.clone();
        dim.illuminance_lux = Band::new(300.0, 2000.0);
        assert_eq!(dim.night_illuminance_max(), 50.0);
    }

    #[test]
    fn band_distance_and_side() {
        let band = Band::new(22.0, 30.0);
        assert_eq!(band.side(21.0), Side::Below);
        assert_eq!(band.side(22.0), Side::Within);
        assert_eq!(band.side(30.0), Side::Within);
        assert_eq!(band.side(31.5), Side::Above);
        assert_eq!(band.distance(26.0), 0.0);
        assert_eq!(band.distance(19.0), 3.0);
        assert_eq!(band.distance(31.5), 1.5);
    }
}
