use crate::error::{Result, VanillaOpsError};
use crate::i18n::Locale;
use crate::logic::{PolicyEngine, SolarClock};
use crate::models::{Policy, PolicyCatalog, SunTable, SunWindow};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const APP_DIR: &str = "vanillaops";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub location: LocationConfig,
    /// Replaces the built-in phase table when present.
    #[serde(default)]
    pub policies: Option<Vec<Policy>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Azores Vanilla Greenhouse".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Directory path or `http(s)://` base URL.
    pub source: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_refresh_secs() -> u64 {
    300
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: "data".into(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    /// Standard-time offset; summer time adds an hour on top.
    pub utc_offset_minutes: i32,
    #[serde(default = "default_eu_summer_time")]
    pub eu_summer_time: bool,
    #[serde(default)]
    pub sun: Option<BTreeMap<u32, SunWindow>>,
}

fn default_eu_summer_time() -> bool {
    true
}

impl Default for LocationConfig {
    fn default() -> Self {
        let clock = SolarClock::azores();
        Self {
            name: clock.location_name,
            utc_offset_minutes: clock.utc_offset_minutes,
            eu_summer_time: clock.eu_summer_time,
            sun: None,
        }
    }
}

impl Config {
    /// Load from the override path or the standard locations. A missing file
    /// is only an error when the path was given explicitly.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) if !p.exists() => {
                return Err(VanillaOpsError::Config(format!(
                    "Config file not found at {:?}",
                    p
                )))
            }
            Some(p) => p,
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| VanillaOpsError::Config(format!("Failed to read config: {}", e)))?;
        tracing::debug!("Loaded config from {}", config_path.display());

        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| VanillaOpsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// `./config/config.yaml`, then the XDG config directory.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.yaml"))
            .filter(|p| p.exists())
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    /// Validate the location and policy sections and build the engine.
    pub fn engine(&self) -> Result<PolicyEngine> {
        let catalog = match &self.policies {
            Some(policies) => PolicyCatalog::new(policies.clone())?,
            None => PolicyCatalog::builtin(),
        };

        let location = &self.location;
        if location.utc_offset_minutes.abs() > 14 * 60 {
            return Err(VanillaOpsError::Config(format!(
                "utc_offset_minutes {} is out of range",
                location.utc_offset_minutes
            )));
        }
        let sun = match &location.sun {
            Some(map) => SunTable::from_map(map)?,
            None => SunTable::ponta_delgada(),
        };

        let clock = SolarClock::new(
            location.name.clone(),
            location.utc_offset_minutes,
            location.eu_summer_time,
            sun,
        );
        Ok(PolicyEngine::new(catalog, clock))
    }

    /// Configured locale; unknown values fall back to English with a warning.
    pub fn locale(&self) -> Locale {
        match self.locale.as_deref() {
            None => Locale::default(),
            Some(code) => Locale::from_str(code).unwrap_or_else(|| {
                tracing::warn!("Unknown locale '{}', using en", code);
                Locale::default()
            }),
        }
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("VANILLAOPS_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| VanillaOpsError::Config("Cannot determine data directory".into()))?
            .join(APP_DIR);

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn log_path(data_dir: &Path) -> PathBuf {
        data_dir.join("vanillaops.log")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            feed: FeedConfig::default(),
            locale: None,
            location: LocationConfig::default(),
            policies: None,
        }
    }
}
