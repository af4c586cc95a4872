use crate::models::{DayPhase, Policy, SunTable};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Month, NaiveDate, NaiveDateTime, Timelike, Utc,
};

/// Local civil time and daylight for the greenhouse site.
///
/// The Azores keep UTC-1 in winter and switch to UTC+0 under the EU summer
/// time rule (last Sunday of March to last Sunday of October, 01:00 UTC).
#[derive(Debug, Clone)]
pub struct SolarClock {
    pub location_name: String,
    pub utc_offset_minutes: i32,
    pub eu_summer_time: bool,
    pub sun: SunTable,
}

impl SolarClock {
    pub fn new(
        location_name: impl Into<String>,
        utc_offset_minutes: i32,
        eu_summer_time: bool,
        sun: SunTable,
    ) -> Self {
        Self {
            location_name: location_name.into(),
            utc_offset_minutes,
            eu_summer_time,
            sun,
        }
    }

    pub fn azores() -> Self {
        Self::new("Ponta Delgada, Azores", -60, true, SunTable::ponta_delgada())
    }

    pub fn offset_minutes_at(&self, now: DateTime<Utc>) -> i32 {
        if self.eu_summer_time && in_eu_summer_time(now) {
            self.utc_offset_minutes + 60
        } else {
            self.utc_offset_minutes
        }
    }

    pub fn offset_at(&self, now: DateTime<Utc>) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.offset_minutes_at(now) * 60)
    }

    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.naive_utc() + Duration::minutes(self.offset_minutes_at(now) as i64)
    }

    pub fn month_at(&self, now: DateTime<Utc>) -> Month {
        local_month(&self.local_time(now))
    }

    pub fn is_daylight(&self, now: DateTime<Utc>) -> bool {
        is_daylight_local(&self.local_time(now), &self.sun)
    }

    pub fn phase_at(&self, now: DateTime<Utc>) -> DayPhase {
        DayPhase::from_daylight(self.is_daylight(now))
    }
}

impl Default for SolarClock {
    fn default() -> Self {
        Self::azores()
    }
}

/// Daylight test on an already-localized time, inclusive of sunrise and sunset.
pub fn is_daylight_local(local: &NaiveDateTime, sun: &SunTable) -> bool {
    let hour = local.hour() as f64 + local.minute() as f64 / 60.0;
    sun.window(local_month(local)).contains(hour)
}

/// `(target, tolerance)` for the current phase.
pub fn vpd_target(policy: &Policy, phase: DayPhase) -> (f64, f64) {
    let vpd = policy.vpd_for(phase);
    (vpd.target, vpd.tolerance)
}

fn local_month(local: &NaiveDateTime) -> Month {
    match u8::try_from(local.month()).ok().and_then(|m| Month::try_from(m).ok()) {
        Some(month) => month,
        None => unreachable!("chrono months are 1-12"),
    }
}

fn in_eu_summer_time(now: DateTime<Utc>) -> bool {
    let year = now.year();
    match (
        last_sunday_at_one_utc(year, 3),
        last_sunday_at_one_utc(year, 10),
    ) {
        (Some(start), Some(end)) => now >= start && now < end,
        _ => false,
    }
}

fn last_sunday_at_one_utc(year: i32, month: u32) -> Option<DateTime<Utc>> {
    let last_day = NaiveDate::from_ymd_opt(year, month, 31)?;
    let back = last_day.weekday().num_days_from_sunday() as i64;
    let sunday = last_day - Duration::days(back);
    Some(sunday.and_hms_opt(1, 0, 0)?.and_utc())
}
