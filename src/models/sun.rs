use super::policy::month_from_number;
use crate::error::{Result, VanillaOpsError};
use chrono::Month;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    Day,
    Night,
}

impl DayPhase {
    pub fn from_daylight(is_day: bool) -> Self {
        if is_day {
            DayPhase::Day
        } else {
            DayPhase::Night
        }
    }

    pub fn is_day(&self) -> bool {
        matches!(self, DayPhase::Day)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPhase::Day => "day",
            DayPhase::Night => "night",
        }
    }
}

impl std::fmt::Display for DayPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sunrise and sunset as fractional local hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunWindow {
    pub sunrise: f64,
    pub sunset: f64,
}

impl SunWindow {
    pub const fn new(sunrise: f64, sunset: f64) -> Self {
        Self { sunrise, sunset }
    }

    /// Both boundaries count as daylight.
    pub fn contains(&self, hour: f64) -> bool {
        hour >= self.sunrise && hour <= self.sunset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunTable {
    windows: [SunWindow; 12],
}

impl SunTable {
    /// 2025 sunrise/sunset hours for Ponta Delgada, Azores.
    pub fn ponta_delgada() -> Self {
        Self {
            windows: [
                SunWindow::new(7.9, 17.5),
                SunWindow::new(7.6, 18.2),
                SunWindow::new(6.8, 18.8),
                SunWindow::new(6.1, 19.3),
                SunWindow::new(5.6, 19.8),
                SunWindow::new(5.4, 20.3),
                SunWindow::new(5.6, 20.3),
                SunWindow::new(6.0, 19.7),
                SunWindow::new(6.4, 18.9),
                SunWindow::new(6.9, 18.1),
                SunWindow::new(7.4, 17.5),
                SunWindow::new(7.9, 17.4),
            ],
        }
    }

    /// Build from a month-keyed map; all twelve months must be present.
    pub fn from_map(map: &BTreeMap<u32, SunWindow>) -> Result<Self> {
        if let Some(month) = map.keys().find(|m| !(1..=12).contains(*m)) {
            return Err(VanillaOpsError::Config(format!(
                "sun table month {} is outside 1-12",
                month
            )));
        }

        let mut windows = [SunWindow::new(0.0, 0.0); 12];
        for (slot, month) in windows.iter_mut().zip(1..=12u32) {
            let window = map.get(&month).ok_or_else(|| {
                VanillaOpsError::Config(format!("sun table is missing month {}", month))
            })?;
            let valid = window.sunrise.is_finite()
                && window.sunset.is_finite()
                && window.sunrise >= 0.0
                && window.sunset <= 24.0
                && window.sunrise < window.sunset;
            if !valid {
                return Err(VanillaOpsError::Config(format!(
                    "sun table month {} has an invalid window {:.2}-{:.2}",
                    month, window.sunrise, window.sunset
                )));
            }
            *slot = *window;
        }

        Ok(Self { windows })
    }

    pub fn window(&self, month: Month) -> SunWindow {
        self.windows[month.number_from_month() as usize - 1]
    }

    pub fn window_for_number(&self, month: u32) -> Result<SunWindow> {
        Ok(self.window(month_from_number(month)?))
    }

    pub fn to_map(&self) -> BTreeMap<u32, SunWindow> {
        (1..=12u32).zip(self.windows.iter().copied()).collect()
    }
}

impl Default for SunTable {
    fn default() -> Self {
        Self::ponta_delgada()
    }
}
