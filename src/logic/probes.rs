use crate::models::{Band, DayPhase, Policy, ProbePair, ProbeVerdict, ProbeVerdicts, Side, Status};

/// Overshoot up to this share of the band width is a caution.
pub const PROBE_CAUTION_FRACTION: f64 = 0.25;

/// Directional verdict over both probes for one metric.
///
/// Probes that disagree in direction (one low, one high) are `Mixed`. When
/// they agree or only one is out of band, severity comes from the furthest
/// reading in that direction relative to the band width.
pub fn classify_pair(values: [Option<f64>; 2], band: Band) -> ProbeVerdict {
    let values: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return ProbeVerdict::Unavailable;
    }

    let low = values.iter().any(|v| band.side(*v) == Side::Below);
    let high = values.iter().any(|v| band.side(*v) == Side::Above);
    let span = band.width().max(1e-9);

    let severity = |side: Side| {
        let worst = values
            .iter()
            .filter(|v| band.side(**v) == side)
            .map(|v| band.distance(*v))
            .fold(0.0, f64::max);
        if worst <= PROBE_CAUTION_FRACTION * span {
            Status::Caution
        } else {
            Status::Critical
        }
    };

    match (low, high) {
        (true, true) => ProbeVerdict::Mixed,
        (true, false) => ProbeVerdict::Low(severity(Side::Below)),
        (false, true) => ProbeVerdict::High(severity(Side::Above)),
        (false, false) => ProbeVerdict::WithinPolicy,
    }
}

pub fn classify_probes(probes: &ProbePair, policy: &Policy, phase: DayPhase) -> ProbeVerdicts {
    ProbeVerdicts {
        moisture: classify_pair(probes.moisture(), policy.soil_moisture_pct),
        conductivity: classify_pair(probes.conductivity(), policy.soil_conductivity_us_cm),
        illuminance: classify_pair(probes.illuminance(), policy.illuminance_for(phase)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PolicyCatalog, ProbeReading};
    use chrono::Month;

    const MOISTURE: Band = Band::new(15.0, 35.0);

    #[test]
    fn both_probes_in_band() {
        assert_eq!(
            classify_pair([Some(15.0), Some(35.0)], MOISTURE),
            ProbeVerdict::WithinPolicy
        );
    }

    #[test]
    fn opposite_directions_are_mixed() {
        assert_eq!(
            classify_pair([Some(10.0), Some(40.0)], MOISTURE),
            ProbeVerdict::Mixed
        );
        assert_eq!(ProbeVerdict::Mixed.status(), Some(Status::Critical));
    }

    #[test]
    fn missing_probes_are_unavailable() {
        assert_eq!(classify_pair([None, None], MOISTURE), ProbeVerdict::Unavailable);
        assert_eq!(
            classify_pair([Some(f64::NAN), None], MOISTURE),
            ProbeVerdict::Unavailable
        );
    }

    #[test]
    fn single_probe_is_enough() {
        assert_eq!(
            classify_pair([None, Some(12.0)], MOISTURE),
            ProbeVerdict::Low(Status::Caution)
        );
        assert_eq!(
            classify_pair([Some(f64::INFINITY), Some(25.0)], MOISTURE),
            ProbeVerdict::WithinPolicy
        );
    }

    #[test]
    fn severity_uses_worst_offender() {
        // Width 20, so up to 5 beyond the bound is a caution
        assert_eq!(
            classify_pair([Some(40.0), Some(36.0)], MOISTURE),
            ProbeVerdict::High(Status::Caution)
        );
        assert_eq!(
            classify_pair([Some(41.0), Some(36.0)], MOISTURE),
            ProbeVerdict::High(Status::Critical)
        );
        assert_eq!(
            classify_pair([Some(25.0), Some(5.0)], MOISTURE),
            ProbeVerdict::Low(Status::Critical)
        );
    }

    #[test]
    fn probe_order_does_not_matter() {
        let cases = [
            [Some(10.0), Some(40.0)],
            [Some(12.0), Some(20.0)],
            [None, Some(50.0)],
            [Some(30.0), Some(f64::NAN)],
        ];
        for [a, b] in cases {
            assert_eq!(
                classify_pair([a, b], MOISTURE),
                classify_pair([b, a], MOISTURE)
            );
        }
    }

    #[test]
    fn zero_width_band_still_classifies() {
        let band = Band::new(20.0, 20.0);
        assert_eq!(classify_pair([Some(20.0), None], band), ProbeVerdict::WithinPolicy);
        assert_eq!(
            classify_pair([Some(21.0), None], band),
            ProbeVerdict::High(Status::Critical)
        );
    }

    #[test]
    fn night_light_uses_reduced_band() {
        let catalog = PolicyCatalog::builtin();
        let policy = catalog.resolve(Month::June);
        let probes = ProbePair::new(
            ProbeReading {
                moisture_pct: Some(25.0),
                conductivity_us_cm: Some(450.0),
                illuminance_lux: Some(400.0),
            },
            ProbeReading {
                moisture_pct: Some(27.0),
                conductivity_us_cm: None,
                illuminance_lux: Some(450.0),
            },
        );

        let night = classify_probes(&probes, policy, DayPhase::Night);
        assert_eq!(night.illuminance, ProbeVerdict::WithinPolicy);
        assert_eq!(night.moisture, ProbeVerdict::WithinPolicy);
        assert_eq!(night.conductivity, ProbeVerdict::WithinPolicy);

        let day = classify_probes(&probes, policy, DayPhase::Day);
        assert_eq!(day.illuminance, ProbeVerdict::Low(Status::Critical));
    }

    #[test]
    fn lit_greenhouse_at_night_is_too_bright() {
        let catalog = PolicyCatalog::builtin();
        let policy = catalog.resolve(Month::January);
        let probes = ProbePair::new(
            ProbeReading {
                illuminance_lux: Some(600.0),
                ..Default::default()
            },
            ProbeReading::default(),
        );
        // Night ceiling is 500 lux, width 500, so 100 over is a caution
        let verdicts = classify_probes(&probes, policy, DayPhase::Night);
        assert_eq!(verdicts.illuminance, ProbeVerdict::High(Status::Caution));
        assert_eq!(verdicts.moisture, ProbeVerdict::Unavailable);
    }
}
