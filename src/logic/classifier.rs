use crate::models::{
    Band, DayPhase, Explanation, MetricAssessment, PlantStatus, Policy, Side, Status,
};

/// Temperature within this many °C beyond a bound is a caution.
pub const TEMPERATURE_CAUTION_C: f64 = 2.0;
/// Humidity within this many points beyond a bound is a caution.
pub const HUMIDITY_CAUTION_PCT: f64 = 5.0;
/// Low VPD is always critical once RH exceeds `h_max` by more than this.
pub const HUMIDITY_CRITICAL_MARGIN_PCT: f64 = 5.0;
/// RH above which warm air counts as fungus weather.
pub const FUNGUS_HUMIDITY_PCT: f64 = 85.0;
/// "Warm" means within this many °C of the policy maximum (or above it).
pub const FUNGUS_TEMPERATURE_WINDOW_C: f64 = 3.0;

/// Three-tier range check: good inside the band, caution while the distance
/// to the nearest bound stays strictly below `caution_margin`, else critical.
pub fn assess_range(value: f64, band: Band, caution_margin: f64) -> MetricAssessment {
    let side = band.side(value);
    let status = match side {
        Side::Within => Status::Good,
        _ if band.distance(value) < caution_margin => Status::Caution,
        _ => Status::Critical,
    };
    MetricAssessment {
        value,
        status,
        side,
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Scores climate readings against one policy in one day phase.
pub struct StatusClassifier<'a> {
    policy: &'a Policy,
    phase: DayPhase,
}

impl<'a> StatusClassifier<'a> {
    pub fn new(policy: &'a Policy, phase: DayPhase) -> Self {
        Self { policy, phase }
    }

    pub fn vpd_band(&self) -> Band {
        self.policy.vpd_for(self.phase).band()
    }

    pub fn assess_temperature(&self, value: Option<f64>) -> Option<MetricAssessment> {
        finite(value)
            .map(|v| assess_range(v, self.policy.temperature_c, TEMPERATURE_CAUTION_C))
    }

    pub fn assess_humidity(&self, value: Option<f64>) -> Option<MetricAssessment> {
        finite(value).map(|v| assess_range(v, self.policy.humidity_pct, HUMIDITY_CAUTION_PCT))
    }

    /// The caution margin scales with the active tolerance.
    pub fn assess_vpd(&self, value: Option<f64>) -> Option<MetricAssessment> {
        let target = self.policy.vpd_for(self.phase);
        finite(value).map(|v| assess_range(v, target.band(), target.caution_margin()))
    }

    pub fn fungus_risk(&self, temperature_c: f64, humidity_pct: f64) -> Status {
        let warm = temperature_c > self.policy.temperature_c.max - FUNGUS_TEMPERATURE_WINDOW_C;
        if humidity_pct > FUNGUS_HUMIDITY_PCT && warm {
            Status::Critical
        } else if humidity_pct > self.policy.humidity_pct.max {
            Status::Caution
        } else {
            Status::Good
        }
    }

    /// CAM-aware indicators. Needs all three climate metrics.
    ///
    /// Vanilla keeps its stomata shut by day and opens them at night, so the
    /// same VPD excursion means different things in each phase. Low VPD is
    /// excess-moisture risk by day and limited transpiration by night; both
    /// feed the primary and secondary indicators. High VPD only touches the
    /// primary indicator (photosynthesis by day, CO2 uptake by night).
    pub fn plant_status(
        &self,
        temperature: &MetricAssessment,
        humidity_pct: f64,
        vpd: &MetricAssessment,
    ) -> PlantStatus {
        let growth = temperature.status;

        let (stomatal, secondary) = match vpd.side {
            Side::Within => (Status::Good, Status::Good),
            Side::Below => {
                let humid_critical =
                    humidity_pct > self.policy.humidity_pct.max + HUMIDITY_CRITICAL_MARGIN_PCT;
                let status = if vpd.status == Status::Caution && !humid_critical {
                    Status::Caution
                } else {
                    Status::Critical
                };
                (status, status)
            }
            Side::Above => (vpd.status, Status::Good),
        };

        let fungus_risk = self.fungus_risk(temperature.value, humidity_pct);
        let explanation = self.explain(growth, stomatal, secondary, humidity_pct);

        PlantStatus {
            phase: self.phase,
            growth,
            stomatal,
            secondary,
            fungus_risk,
            explanation,
        }
    }

    /// Worst of growth, stomatal and secondary picks the narrative; ties go
    /// to growth, then stomatal, then secondary.
    fn explain(
        &self,
        growth: Status,
        stomatal: Status,
        secondary: Status,
        humidity_pct: f64,
    ) -> Explanation {
        let secondary_narrative = |status: Status| match (self.phase, status) {
            (DayPhase::Day, Status::Critical) => Explanation::MoistureCritical,
            (DayPhase::Day, _) => Explanation::MoistureWarning,
            (DayPhase::Night, Status::Critical) => Explanation::TranspirationCritical,
            (DayPhase::Night, _) => Explanation::TranspirationWarning,
        };

        match Status::worst(&[growth, stomatal, secondary]) {
            Status::Good => Explanation::AllOptimal,
            Status::Critical => {
                if growth == Status::Critical {
                    Explanation::TempCritical
                } else if stomatal == Status::Critical {
                    Explanation::TranspirationCritical
                } else {
                    secondary_narrative(Status::Critical)
                }
            }
            Status::Caution => {
                if growth == Status::Caution {
                    Explanation::TempWarning
                } else if stomatal == Status::Caution {
                    if self.policy.humidity_pct.distance(humidity_pct) > HUMIDITY_CAUTION_PCT {
                        Explanation::TranspirationWarningHighHumidity
                    } else {
                        Explanation::TranspirationWarning
                    }
                } else {
                    secondary_narrative(Status::Caution)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PolicyCatalog, VpdTarget};
    use chrono::Month;

    fn flowering() -> Policy {
        // t 22-30, RH 75-85, day VPD 0.8 ± 0.2, night VPD 0.5 ± 0.1
        PolicyCatalog::builtin().resolve(Month::June).clone()
    }

    #[test]
    fn temperature_bounds_are_inclusive() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        for t in [policy.temperature_c.min, policy.temperature_c.max] {
            let a = classifier.assess_temperature(Some(t)).unwrap();
            assert_eq!(a.status, Status::Good, "t = {}", t);
            assert_eq!(a.side, Side::Within);
        }
    }

    #[test]
    fn temperature_caution_and_critical() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);

        let warm = classifier.assess_temperature(Some(31.0)).unwrap();
        assert_eq!(warm.status, Status::Caution);
        assert_eq!(warm.side, Side::Above);

        // Exactly two degrees out is no longer a caution
        let hot = classifier.assess_temperature(Some(32.0)).unwrap();
        assert_eq!(hot.status, Status::Critical);

        let cold = classifier.assess_temperature(Some(20.5)).unwrap();
        assert_eq!(cold.status, Status::Caution);
        assert_eq!(cold.side, Side::Below);
        assert_eq!(
            classifier.assess_temperature(Some(15.0)).unwrap().status,
            Status::Critical
        );
    }

    #[test]
    fn humidity_margin_is_five_points() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        assert_eq!(
            classifier.assess_humidity(Some(71.0)).unwrap().status,
            Status::Caution
        );
        assert_eq!(
            classifier.assess_humidity(Some(70.0)).unwrap().status,
            Status::Critical
        );
        assert_eq!(
            classifier.assess_humidity(Some(89.5)).unwrap().status,
            Status::Caution
        );
    }

    #[test]
    fn non_finite_readings_are_unavailable() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        assert!(classifier.assess_temperature(Some(f64::NAN)).is_none());
        assert!(classifier.assess_humidity(Some(f64::INFINITY)).is_none());
        assert!(classifier.assess_vpd(Some(f64::NEG_INFINITY)).is_none());
        assert!(classifier.assess_vpd(None).is_none());
    }

    #[test]
    fn day_scenario_all_good() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        let t = classifier.assess_temperature(Some(26.0)).unwrap();
        let h = classifier.assess_humidity(Some(80.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.85)).unwrap();
        assert_eq!(
            (t.status, h.status, v.status),
            (Status::Good, Status::Good, Status::Good)
        );

        let plant = classifier.plant_status(&t, 80.0, &v);
        assert_eq!(plant.explanation, Explanation::AllOptimal);
        assert_eq!(plant.fungus_risk, Status::Good);
    }

    #[test]
    fn day_scenario_warm_temperature() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        let t = classifier.assess_temperature(Some(31.0)).unwrap();
        let h = classifier.assess_humidity(Some(80.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.85)).unwrap();
        assert_eq!(t.status, Status::Caution);
        assert_eq!(h.status, Status::Good);
        assert_eq!(v.status, Status::Good);

        let plant = classifier.plant_status(&t, 80.0, &v);
        assert_eq!(plant.growth, Status::Caution);
        assert_eq!(plant.explanation, Explanation::TempWarning);
    }

    #[test]
    fn night_scenario_low_vpd_limits_transpiration() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        let t = classifier.assess_temperature(Some(24.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.25)).unwrap();
        assert_eq!(v.status, Status::Critical);
        assert_eq!(v.side, Side::Below);

        let plant = classifier.plant_status(&t, 80.0, &v);
        assert_eq!(plant.stomatal, Status::Critical);
        assert_eq!(plant.secondary, Status::Critical);
        assert_eq!(plant.secondary_key(), "vpd_night_trans_limited");
        assert_eq!(plant.explanation, Explanation::TranspirationCritical);
    }

    #[test]
    fn low_vpd_caution_escalates_only_with_very_high_humidity() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        let t = classifier.assess_temperature(Some(24.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.35)).unwrap();
        assert_eq!(v.status, Status::Caution);

        let moderate = classifier.plant_status(&t, 80.0, &v);
        assert_eq!(moderate.stomatal, Status::Caution);
        assert_eq!(moderate.secondary, Status::Caution);
        assert_eq!(moderate.explanation, Explanation::TranspirationWarning);

        // h_max + 5 itself is not above the threshold
        let edge = classifier.plant_status(&t, 90.0, &v);
        assert_eq!(edge.secondary, Status::Caution);

        let saturated = classifier.plant_status(&t, 91.0, &v);
        assert_eq!(saturated.stomatal, Status::Critical);
        assert_eq!(saturated.secondary, Status::Critical);
    }

    #[test]
    fn vpd_tie_at_one_and_a_half_tolerance_is_critical() {
        // Binary-exact values: band 0.75-1.25, caution margin 0.375
        let mut policy = flowering();
        policy.day_vpd = VpdTarget::new(1.0, 0.25);
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);

        let inside_margin = classifier.assess_vpd(Some(0.5)).unwrap();
        assert_eq!(inside_margin.status, Status::Caution);

        let tie = classifier.assess_vpd(Some(0.375)).unwrap();
        assert_eq!(tie.status, Status::Critical);

        let tie_high = classifier.assess_vpd(Some(1.625)).unwrap();
        assert_eq!(tie_high.status, Status::Critical);
    }

    #[test]
    fn vpd_band_edges_as_published_are_good() {
        for policy in PolicyCatalog::builtin().policies() {
            for phase in [DayPhase::Day, DayPhase::Night] {
                let vpd = policy.vpd_for(phase);
                let classifier = StatusClassifier::new(policy, phase);
                // Edges as a two-decimal feed would report them
                let low = format!("{:.2}", vpd.target - vpd.tolerance);
                let high = format!("{:.2}", vpd.target + vpd.tolerance);
                for edge in [low, high] {
                    let value: f64 = edge.parse().unwrap();
                    let assessment = classifier.assess_vpd(Some(value)).unwrap();
                    assert_eq!(
                        assessment.status,
                        Status::Good,
                        "{} {} vpd {}",
                        policy.name,
                        phase,
                        edge
                    );
                    assert_eq!(assessment.side, Side::Within);
                }
            }
        }
    }

    #[test]
    fn vpd_severity_is_monotonic_in_distance() {
        let policy = flowering();
        for phase in [DayPhase::Day, DayPhase::Night] {
            let classifier = StatusClassifier::new(&policy, phase);
            let target = policy.vpd_for(phase).target;

            for direction in [-1.0, 1.0] {
                let mut previous = Status::Good;
                for step in 0..200 {
                    let value = target + direction * step as f64 * 0.01;
                    let status = classifier.assess_vpd(Some(value)).unwrap().status;
                    assert!(
                        status >= previous,
                        "{:?}: {} improved to {:?}",
                        phase,
                        value,
                        status
                    );
                    previous = status;
                }
                assert_eq!(previous, Status::Critical);
            }
        }
    }

    #[test]
    fn high_vpd_by_day_raises_no_secondary_concern() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        let t = classifier.assess_temperature(Some(26.0)).unwrap();
        let v = classifier.assess_vpd(Some(1.5)).unwrap();
        assert_eq!(v.status, Status::Critical);

        let plant = classifier.plant_status(&t, 76.0, &v);
        assert_eq!(plant.stomatal, Status::Critical);
        assert_eq!(plant.stomatal_key(), "vpd_day_photo_limited");
        assert_eq!(plant.secondary, Status::Good);
        assert_eq!(plant.explanation, Explanation::TranspirationCritical);
    }

    #[test]
    fn high_vpd_by_night_limits_co2_uptake() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        let t = classifier.assess_temperature(Some(24.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.65)).unwrap();
        assert_eq!(v.status, Status::Caution);

        let plant = classifier.plant_status(&t, 78.0, &v);
        assert_eq!(plant.stomatal, Status::Caution);
        assert_eq!(plant.stomatal_key(), "vpd_night_co2_limited");
        assert_eq!(plant.secondary, Status::Good);
    }

    #[test]
    fn low_vpd_by_day_is_moisture_risk() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        let t = classifier.assess_temperature(Some(25.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.5)).unwrap();
        assert_eq!(v.status, Status::Caution);

        let plant = classifier.plant_status(&t, 84.0, &v);
        assert_eq!(plant.secondary, Status::Caution);
        assert_eq!(plant.secondary_key(), "vpd_day_excess_moisture");
        // Stomatal is checked before secondary when both are cautions
        assert_eq!(plant.explanation, Explanation::TranspirationWarning);
    }

    #[test]
    fn explanation_prefers_growth_on_ties() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        let t = classifier.assess_temperature(Some(40.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.1)).unwrap();
        let plant = classifier.plant_status(&t, 95.0, &v);
        assert_eq!(plant.growth, Status::Critical);
        assert_eq!(plant.stomatal, Status::Critical);
        assert_eq!(plant.explanation, Explanation::TempCritical);
    }

    #[test]
    fn explanation_flags_humidity_far_outside_band() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        let t = classifier.assess_temperature(Some(24.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.65)).unwrap();
        let plant = classifier.plant_status(&t, 68.0, &v);
        assert_eq!(plant.explanation, Explanation::TranspirationWarningHighHumidity);
    }

    #[test]
    fn explanation_ignores_humidity_inside_band() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        let t = classifier.assess_temperature(Some(24.0)).unwrap();
        let v = classifier.assess_vpd(Some(0.65)).unwrap();
        // 82 is within 75-85 even though it is 7 points above h_min
        let plant = classifier.plant_status(&t, 82.0, &v);
        assert_eq!(plant.explanation, Explanation::TranspirationWarning);
    }

    #[test]
    fn fungus_risk_levels() {
        let policy = flowering();
        let classifier = StatusClassifier::new(&policy, DayPhase::Night);
        // Humid and within 3°C of the 30°C max
        assert_eq!(classifier.fungus_risk(28.0, 88.0), Status::Critical);
        // Humid but cool
        assert_eq!(classifier.fungus_risk(24.0, 88.0), Status::Caution);
        // Both thresholds are strict
        assert_eq!(classifier.fungus_risk(29.0, 85.5), Status::Critical);
        assert_eq!(classifier.fungus_risk(29.0, 85.0), Status::Good);
        assert_eq!(classifier.fungus_risk(29.0, 70.0), Status::Good);
    }

    #[test]
    fn fungus_caution_when_above_policy_humidity() {
        let policy = PolicyCatalog::builtin().resolve(Month::January).clone();
        let classifier = StatusClassifier::new(&policy, DayPhase::Day);
        // Dormancy h_max is 75
        assert_eq!(classifier.fungus_risk(23.0, 78.0), Status::Caution);
        assert_eq!(classifier.fungus_risk(23.0, 86.0), Status::Critical);
        assert_eq!(classifier.fungus_risk(19.0, 86.0), Status::Caution);
    }
}
