use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "calendar.toml";
pub const SUPPORTED_SCHEMES: [&str; 4] = ["file://", "http://", "https://", "webcal://"];
/// Longest accepted lookahead, ten years.
pub const MAX_DAYS: u32 = 3650;
/// Longest accepted spacing between refreshes, one week.
pub const MAX_MIN_REFRESH_SECONDS: u64 = 7 * 24 * 60 * 60;

fn default_days() -> u32 {
    365
}

fn default_max_events() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_min_refresh_seconds() -> u64 {
    120
}

/// One iCalendar feed and how to present it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub name: String,
    pub url: String,
    /// Lookahead window length, starting today.
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    /// Case-insensitive summary filter for the agenda. Empty keeps everything.
    #[serde(default)]
    pub filter_keyword: String,
    /// IANA zone used for floating times and for presenting occurrences.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    #[serde(default = "default_min_refresh_seconds")]
    pub min_refresh_seconds: u64,
}

impl CalendarSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Calendar source name cannot be empty".to_string());
        }

        if !Self::is_supported_url(&self.url) {
            return Err(format!(
                "Calendar source URL must start with one of: {}",
                SUPPORTED_SCHEMES.join(", ")
            ));
        }

        if self.days == 0 {
            return Err("Lookahead days must be greater than 0".to_string());
        }

        if self.days > MAX_DAYS {
            return Err(format!("Lookahead days cannot exceed {}", MAX_DAYS));
        }

        if self.max_events == 0 {
            return Err("Max events must be greater than 0".to_string());
        }

        if self.min_refresh_seconds > MAX_MIN_REFRESH_SECONDS {
            return Err(format!(
                "Minimum refresh interval cannot exceed {} seconds",
                MAX_MIN_REFRESH_SECONDS
            ));
        }

        if Tz::from_str(&self.default_timezone).is_err() {
            return Err(format!(
                "Unknown default timezone '{}'",
                self.default_timezone
            ));
        }

        Ok(())
    }

    pub fn is_supported_url(url: &str) -> bool {
        let trimmed = url.trim();
        SUPPORTED_SCHEMES
            .iter()
            .any(|scheme| trimmed.len() > scheme.len() && trimmed.starts_with(scheme))
    }

    /// The configured default zone. Call after [`validate`](Self::validate).
    pub fn timezone(&self) -> Result<Tz> {
        Tz::from_str(&self.default_timezone)
            .map_err(|err| anyhow!("Unknown default timezone '{}': {}", self.default_timezone, err))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let source: CalendarSource =
            toml::from_str(content).context("Failed to parse calendar configuration")?;
        source.validate().map_err(|err| anyhow!(err))?;
        Ok(source)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize calendar configuration")
    }

    /// `<config dir>/calendar.toml` for the current user.
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "KenBoyle", "ICalAgenda") {
            proj_dirs.config_dir().join(CONFIG_FILE_NAME)
        } else {
            PathBuf::from(CONFIG_FILE_NAME)
        }
    }
}

impl Default for CalendarSource {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            days: default_days(),
            max_events: default_max_events(),
            verify_ssl: true,
            filter_keyword: String::new(),
            default_timezone: default_timezone(),
            min_refresh_seconds: default_min_refresh_seconds(),
        }
    }
}
