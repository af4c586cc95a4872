use super::classifier::StatusClassifier;
use super::probes::classify_probes;
use super::solar_clock::SolarClock;
use crate::models::{
    Classification, DayPhase, Policy, PolicyCatalog, Reading, TargetBands,
};
use chrono::{DateTime, Utc};

/// Month-to-policy lookup plus site clock. Immutable once built, so one
/// engine can be shared across tasks.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    catalog: PolicyCatalog,
    clock: SolarClock,
}

impl PolicyEngine {
    pub fn new(catalog: PolicyCatalog, clock: SolarClock) -> Self {
        Self { catalog, clock }
    }

    pub fn builtin() -> Self {
        Self::new(PolicyCatalog::builtin(), SolarClock::azores())
    }

    pub fn catalog(&self) -> &PolicyCatalog {
        &self.catalog
    }

    pub fn clock(&self) -> &SolarClock {
        &self.clock
    }

    pub fn policy_at(&self, now: DateTime<Utc>) -> &Policy {
        self.catalog.resolve(self.clock.month_at(now))
    }

    pub fn phase_at(&self, now: DateTime<Utc>) -> DayPhase {
        self.clock.phase_at(now)
    }

    /// Classify a reading against the policy and phase in force at `now`.
    pub fn evaluate(&self, reading: &Reading, now: DateTime<Utc>) -> Classification {
        let policy = self.policy_at(now);
        let phase = self.phase_at(now);
        tracing::debug!(
            "Evaluating against {} ({}) at {}",
            policy.name,
            phase,
            self.clock.local_time(now)
        );
        evaluate_with(reading, policy, phase, now)
    }
}

pub fn target_bands(policy: &Policy, phase: DayPhase) -> TargetBands {
    let vpd_target = policy.vpd_for(phase);
    TargetBands {
        temperature_c: policy.temperature_c,
        humidity_pct: policy.humidity_pct,
        vpd_kpa: vpd_target.band(),
        vpd_target_kpa: vpd_target.target,
        soil_moisture_pct: policy.soil_moisture_pct,
        soil_conductivity_us_cm: policy.soil_conductivity_us_cm,
        illuminance_lux: policy.illuminance_for(phase),
    }
}

/// Pure evaluation against an explicit policy and phase.
pub fn evaluate_with(
    reading: &Reading,
    policy: &Policy,
    phase: DayPhase,
    evaluated_at: DateTime<Utc>,
) -> Classification {
    let classifier = StatusClassifier::new(policy, phase);

    let temperature = classifier.assess_temperature(reading.temperature_c);
    let humidity = classifier.assess_humidity(reading.humidity_pct);
    let vpd = classifier.assess_vpd(reading.vpd_kpa);

    let plant = match (&temperature, &humidity, &vpd) {
        (Some(t), Some(h), Some(v)) => Some(classifier.plant_status(t, h.value, v)),
        _ => None,
    };

    Classification {
        evaluated_at,
        policy_name: policy.name.clone(),
        phase,
        bands: target_bands(policy, phase),
        temperature,
        humidity,
        vpd,
        plant,
        probes: classify_probes(&reading.probes, policy, phase),
    }
}
