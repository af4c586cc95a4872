use super::engine::PolicyEngine;
use crate::error::{Result, VanillaOpsError};
use crate::models::{Classification, ClimateRow, Zone};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Longest span one history request may cover.
pub const MAX_RANGE_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationFilter {
    Zone(Zone),
    Both,
}

impl LocationFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationFilter::Zone(zone) => zone.as_str(),
            LocationFilter::Both => "both",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "both" | "all" => Some(LocationFilter::Both),
            other => Zone::from_str(other).map(LocationFilter::Zone),
        }
    }

    pub fn matches(&self, row: &ClimateRow) -> bool {
        match self {
            LocationFilter::Both => true,
            LocationFilter::Zone(zone) => row.location() == zone.as_str(),
        }
    }
}

impl Default for LocationFilter {
    fn default() -> Self {
        LocationFilter::Zone(Zone::Greenhouse)
    }
}

impl std::fmt::Display for LocationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whole-day range over the stats table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub location: LocationFilter,
}

impl HistoryQuery {
    pub fn new(from: NaiveDate, to: NaiveDate, location: LocationFilter) -> Result<Self> {
        let query = Self { from, to, location };
        if to < from {
            return Err(VanillaOpsError::InvalidDateRange(format!(
                "{} is before {}",
                to, from
            )));
        }
        if query.end() - query.start() > Duration::days(MAX_RANGE_DAYS) {
            return Err(VanillaOpsError::InvalidDateRange(format!(
                "maximum {} days per request",
                MAX_RANGE_DAYS
            )));
        }
        Ok(query)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.to.and_hms_opt(23, 59, 59).unwrap_or(self.to.and_time(NaiveTime::MIN))
    }

    pub fn matches(&self, row: &ClimateRow) -> bool {
        let in_range = row
            .timestamp
            .is_some_and(|ts| ts >= self.start() && ts <= self.end());
        in_range && self.location.matches(row)
    }

    /// Rows in range, in file order. An empty selection is an error so
    /// callers can tell the user instead of drawing an empty table.
    pub fn apply<'a>(&self, rows: &'a [ClimateRow]) -> Result<Vec<&'a ClimateRow>> {
        let selected: Vec<&ClimateRow> = rows.iter().filter(|r| self.matches(r)).collect();
        if selected.is_empty() {
            return Err(VanillaOpsError::NotFound(format!(
                "no {} data between {} and {}",
                self.location, self.from, self.to
            )));
        }
        tracing::debug!(
            "History {}..{} ({}): {} of {} rows",
            self.from,
            self.to,
            self.location,
            selected.len(),
            rows.len()
        );
        Ok(selected)
    }
}

/// Re-run the engine on the newest selected row.
pub fn evaluate_latest(
    rows: &[&ClimateRow],
    engine: &PolicyEngine,
    now: DateTime<Utc>,
) -> Option<Classification> {
    rows.last()
        .map(|row| engine.evaluate(&row.to_reading(), now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::TimeZone;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn row(ts: &str, location: &str, temp: &str, hum: &str, vpd: &str) -> ClimateRow {
        ClimateRow {
            values: [
                ts.into(),
                location.into(),
                temp.into(),
                hum.into(),
                vpd.into(),
                "20.1".into(),
            ],
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").ok(),
        }
    }

    fn sample() -> Vec<ClimateRow> {
        vec![
            row("2025-06-09 23:59:59", "greenhouse", "24", "80", "0.7"),
            row("2025-06-10 00:00:00", "greenhouse", "25", "80", "0.7"),
            row("2025-06-10 12:00:00", "outdoor", "19", "70", "0.6"),
            row("2025-06-11 23:59:59", "greenhouse", "31", "80", "0.85"),
            row("2025-06-12 00:00:00", "greenhouse", "26", "80", "0.7"),
        ]
    }

    #[test]
    fn range_is_inclusive_of_whole_days() {
        let rows = sample();
        let query = HistoryQuery::new(date(10), date(11), LocationFilter::default()).unwrap();
        let selected = query.apply(&rows).unwrap();
        let stamps: Vec<&str> = selected.iter().map(|r| r.timestamp_text()).collect();
        assert_eq!(stamps, vec!["2025-06-10 00:00:00", "2025-06-11 23:59:59"]);
    }

    #[test]
    fn both_locations() {
        let rows = sample();
        let query = HistoryQuery::new(date(10), date(10), LocationFilter::Both).unwrap();
        assert_eq!(query.apply(&rows).unwrap().len(), 2);

        let outdoor = LocationFilter::from_str("outdoor").unwrap();
        let query = HistoryQuery::new(date(10), date(11), outdoor).unwrap();
        assert_eq!(query.apply(&rows).unwrap().len(), 1);
    }

    #[test]
    fn range_limited_to_two_days() {
        assert!(HistoryQuery::new(date(10), date(11), LocationFilter::Both).is_ok());
        assert!(matches!(
            HistoryQuery::new(date(10), date(12), LocationFilter::Both),
            Err(VanillaOpsError::InvalidDateRange(_))
        ));
        assert!(matches!(
            HistoryQuery::new(date(12), date(10), LocationFilter::Both),
            Err(VanillaOpsError::InvalidDateRange(_))
        ));
    }

    #[test]
    fn empty_selection_is_an_error() {
        let rows = sample();
        let query = HistoryQuery::new(date(20), date(21), LocationFilter::Both).unwrap();
        assert!(matches!(query.apply(&rows), Err(VanillaOpsError::NotFound(_))));
    }

    #[test]
    fn latest_row_is_re_evaluated() {
        let rows = sample();
        let query = HistoryQuery::new(date(10), date(11), LocationFilter::default()).unwrap();
        let selected = query.apply(&rows).unwrap();

        let engine = PolicyEngine::builtin();
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 13, 0, 0).unwrap();
        let result = evaluate_latest(&selected, &engine, now).unwrap();
        assert_eq!(result.temperature.unwrap().value, 31.0);
        assert_eq!(result.temperature.unwrap().status, Status::Caution);
        assert!(evaluate_latest(&[], &engine, now).is_none());
    }

    #[test]
    fn location_filter_names() {
        assert_eq!(LocationFilter::from_str("both"), Some(LocationFilter::Both));
        assert_eq!(
            LocationFilter::from_str("Greenhouse"),
            Some(LocationFilter::Zone(Zone::Greenhouse))
        );
        assert_eq!(LocationFilter::from_str("roof"), None);
        assert_eq!(LocationFilter::Both.to_string(), "both");
    }
}
