use crate::i18n::{self, Locale};
use crate::logic::charts::ChartMetric;
use crate::logic::{FeedSnapshot, PolicyEngine};
use crate::models::{Classification, Policy, Zone};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Probes,
    Trends,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Dashboard, Screen::Probes, Screen::Trends];

    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Probes),
            '3' => Some(Screen::Trends),
            _ => None,
        }
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            Screen::Dashboard => "tab_dashboard",
            Screen::Probes => "tab_probes",
            Screen::Trends => "tab_trends",
        }
    }
}

pub struct TrendsState {
    pub selected: usize,
}

impl TrendsState {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn metric(&self) -> ChartMetric {
        ChartMetric::ALL[self.selected % ChartMetric::ALL.len()]
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % ChartMetric::ALL.len();
    }

    pub fn prev(&mut self) {
        self.selected = (self.selected + ChartMetric::ALL.len() - 1) % ChartMetric::ALL.len();
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub engine: PolicyEngine,
    pub locale: Locale,
    pub site_name: String,
    pub data_dir: PathBuf,

    // Data
    pub feed: FeedSnapshot,
    pub greenhouse: Option<Classification>,
    pub outdoor: Option<Classification>,

    // Screen states
    pub trends_state: TrendsState,

    // UI state
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub refreshing: bool,
    pub needs_refresh: bool,
    pub last_refresh: Option<Instant>,
    pub refresh_interval: Duration,
}

impl App {
    pub fn new(engine: PolicyEngine, locale: Locale, site_name: String, data_dir: PathBuf) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            engine,
            locale,
            site_name,
            data_dir,
            feed: FeedSnapshot::default(),
            greenhouse: None,
            outdoor: None,
            trends_state: TrendsState::new(),
            status_message: None,
            status_is_error: false,
            refreshing: false,
            needs_refresh: false,
            last_refresh: None,
            refresh_interval: Duration::from_secs(300),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
        self.status_is_error = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn request_refresh(&mut self) {
        self.needs_refresh = true;
        self.set_status(&i18n::translate(self.locale, "loading"));
    }

    /// Due when nothing has been fetched yet or the interval has elapsed.
    pub fn refresh_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now.duration_since(last) >= self.refresh_interval,
        }
    }

    pub fn update_feed(&mut self, feed: FeedSnapshot) {
        self.feed = feed;
        self.last_refresh = Some(Instant::now());
        self.reclassify(Utc::now());
    }

    /// Evaluate the stored snapshot again, e.g. after the clock crossed sunset.
    pub fn reclassify(&mut self, now: DateTime<Utc>) {
        self.greenhouse = self
            .feed
            .latest
            .reading(Zone::Greenhouse)
            .map(|r| self.engine.evaluate(&r, now));
        self.outdoor = self
            .feed
            .latest
            .reading(Zone::Outdoor)
            .map(|r| self.engine.evaluate(&r, now));
    }

    pub fn toggle_locale(&mut self) {
        self.locale = self.locale.toggle();
        if let Err(e) = i18n::save_locale(&self.data_dir, self.locale) {
            tracing::warn!("Failed to save language choice: {}", e);
        }
        self.reclassify(Utc::now());
        self.clear_status();
    }

    pub fn classification(&self, zone: Zone) -> Option<&Classification> {
        match zone {
            Zone::Greenhouse => self.greenhouse.as_ref(),
            Zone::Outdoor => self.outdoor.as_ref(),
        }
    }

    /// Policy behind the greenhouse classification, or the one in force now.
    pub fn active_policy(&self) -> &Policy {
        self.greenhouse
            .as_ref()
            .and_then(|c| self.engine.catalog().get(&c.policy_name))
            .unwrap_or_else(|| self.engine.policy_at(Utc::now()))
    }

    pub fn t(&self, key: &str) -> String {
        i18n::translate(self.locale, key)
    }
}
