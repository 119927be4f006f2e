use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SchedulerError;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub availability: AvailabilityConfig,
    pub scoring: ScoringConfig,
    pub meeting: MeetingConfig,
    pub general: GeneralConfig,
}

/// Work-day window and buffer rules used by the free-slot finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    /// Idle padding required before and after a busy event
    pub buffer_minutes: u32,
    pub work_start: u32,
    pub work_end: u32,
    /// Candidates starting before this hour are dropped when mornings are avoided
    pub avoid_morning_before_hour: u32,
    /// Whether cancelled events still consume buffer space
    pub cancelled_events_block: bool,
}

/// Weights used by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub preferred_hour_bonus: i32,
    pub risky_hour_penalty: i32,
    pub morning_band_start: u32,
    pub morning_band_end: u32,
    pub morning_band_bonus: i32,
    pub high_priority_bonus: i32,
}

/// Shape of the meeting handed to the event creator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingConfig {
    pub title: String,
    pub duration_minutes: u32,
}

/// General application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Scheduling day; falls back to the first event's date, then today
    pub day: Option<NaiveDate>,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            availability: AvailabilityConfig::default(),
            scoring: ScoringConfig::default(),
            meeting: MeetingConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 15,
            work_start: 9,
            work_end: 18,
            avoid_morning_before_hour: 12,
            cancelled_events_block: true,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            preferred_hour_bonus: 10,
            risky_hour_penalty: 5,
            morning_band_start: 9,
            morning_band_end: 12,
            morning_band_bonus: 3,
            high_priority_bonus: 5,
        }
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            title: "Meeting".to_string(),
            duration_minutes: 30,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            day: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut config = Self::load_from_path(&Self::get_config_path())?.unwrap_or_default();
        config.load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, `None` when it does not exist
    pub fn load_from_path(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load configuration from environment variables
    fn load_from_env(&mut self) -> Result<(), SchedulerError> {
        self.apply_env_overrides(|name| env::var(name).ok())
    }

    /// Overlay `SLOTWISE_*` values from `lookup`. A malformed value is an
    /// error rather than a silent fallback to the file or default.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), SchedulerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(buffer) = env_number(&lookup, "SLOTWISE_BUFFER_MINUTES")? {
            self.availability.buffer_minutes = buffer;
        }

        if let Some(start) = env_number(&lookup, "SLOTWISE_WORK_START")? {
            self.availability.work_start = start;
        }

        if let Some(end) = env_number(&lookup, "SLOTWISE_WORK_END")? {
            self.availability.work_end = end;
        }

        if let Some(day) = lookup("SLOTWISE_DAY") {
            let parsed = day.trim().parse::<NaiveDate>().map_err(|_| {
                SchedulerError::InvalidConfig(format!("SLOTWISE_DAY={} is not a YYYY-MM-DD date", day))
            })?;
            self.general.day = Some(parsed);
        }

        if let Some(verbose) = lookup("SLOTWISE_VERBOSE") {
            self.general.verbose = match verbose.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(SchedulerError::InvalidConfig(format!(
                        "SLOTWISE_VERBOSE={} is not a boolean",
                        verbose
                    )))
                }
            };
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn get_config_path() -> PathBuf {
        // Use ~/.config/slotwise/config.toml consistently across platforms
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("slotwise");
        path.push("config.toml");
        path
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let availability = &self.availability;
        if availability.work_start >= availability.work_end {
            return Err(SchedulerError::InvalidConfig(format!(
                "work_start ({}) must be before work_end ({})",
                availability.work_start, availability.work_end
            )));
        }

        if availability.work_end > 24 {
            return Err(SchedulerError::InvalidConfig(format!(
                "work_end must be at most 24, got {}",
                availability.work_end
            )));
        }

        if availability.avoid_morning_before_hour > 24 {
            return Err(SchedulerError::InvalidConfig(format!(
                "avoid_morning_before_hour must be at most 24, got {}",
                availability.avoid_morning_before_hour
            )));
        }

        let scoring = &self.scoring;
        if scoring.morning_band_start > scoring.morning_band_end || scoring.morning_band_end > 23 {
            return Err(SchedulerError::InvalidConfig(format!(
                "morning band [{}, {}] must be an ordered range within 0..=23",
                scoring.morning_band_start, scoring.morning_band_end
            )));
        }

        if self.meeting.duration_minutes == 0 {
            return Err(SchedulerError::InvalidConfig(
                "meeting duration must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a sample configuration file
    pub fn create_sample_config() -> Result<()> {
        let config = Self::default();
        let config_path = Self::get_config_path();

        if config_path.exists() {
            println!("Configuration file already exists at: {}", config_path.display());
            return Ok(());
        }

        config.save()?;

        println!("Created sample configuration file at: {}", config_path.display());
        println!("Edit the file or override values with environment variables:");
        println!("  SLOTWISE_BUFFER_MINUTES=15");
        println!("  SLOTWISE_WORK_START=9");
        println!("  SLOTWISE_WORK_END=18");

        Ok(())
    }

    /// Set a configuration value
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "availability.buffer_minutes" => {
                self.availability.buffer_minutes = parse_value(key, value)?;
            }
            "availability.work_start" => {
                self.availability.work_start = parse_value(key, value)?;
            }
            "availability.work_end" => {
                self.availability.work_end = parse_value(key, value)?;
            }
            "availability.avoid_morning_before_hour" => {
                self.availability.avoid_morning_before_hour = parse_value(key, value)?;
            }
            "availability.cancelled_events_block" => {
                self.availability.cancelled_events_block = parse_value(key, value)?;
            }
            "scoring.preferred_hour_bonus" => {
                self.scoring.preferred_hour_bonus = parse_value(key, value)?;
            }
            "scoring.risky_hour_penalty" => {
                self.scoring.risky_hour_penalty = parse_value(key, value)?;
            }
            "scoring.morning_band_start" => {
                self.scoring.morning_band_start = parse_value(key, value)?;
            }
            "scoring.morning_band_end" => {
                self.scoring.morning_band_end = parse_value(key, value)?;
            }
            "scoring.morning_band_bonus" => {
                self.scoring.morning_band_bonus = parse_value(key, value)?;
            }
            "scoring.high_priority_bonus" => {
                self.scoring.high_priority_bonus = parse_value(key, value)?;
            }
            "meeting.title" => {
                self.meeting.title = value.to_string();
            }
            "meeting.duration_minutes" => {
                self.meeting.duration_minutes = parse_value(key, value)?;
            }
            "general.day" => {
                self.general.day = if value.is_empty() {
                    None
                } else {
                    Some(parse_value(key, value)?)
                };
            }
            "general.verbose" => {
                self.general.verbose = parse_value(key, value)?;
            }
            _ => {
                return Err(anyhow::anyhow!("Unknown configuration key: {}", key));
            }
        }
        self.validate()?;
        Ok(())
    }

    /// Get available configuration keys
    pub fn get_available_keys() -> Vec<&'static str> {
        vec![
            "availability.buffer_minutes",
            "availability.work_start",
            "availability.work_end",
            "availability.avoid_morning_before_hour",
            "availability.cancelled_events_block",
            "scoring.preferred_hour_bonus",
            "scoring.risky_hour_penalty",
            "scoring.morning_band_start",
            "scoring.morning_band_end",
            "scoring.morning_band_bonus",
            "scoring.high_priority_bonus",
            "meeting.title",
            "meeting.duration_minutes",
            "general.day",
            "general.verbose",
        ]
    }
}

fn env_number<F>(lookup: &F, name: &str) -> Result<Option<u32>, SchedulerError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            SchedulerError::InvalidConfig(format!("{}={} is not a non-negative integer", name, raw))
        }),
        None => Ok(None),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, value))
}

/// Configuration builder for programmatic configuration
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn buffer_minutes(mut self, minutes: u32) -> Self {
        self.config.availability.buffer_minutes = minutes;
        self
    }

    pub fn work_hours(mut self, start: u32, end: u32) -> Self {
        self.config.availability.work_start = start;
        self.config.availability.work_end = end;
        self
    }

    pub fn cancelled_events_block(mut self, block: bool) -> Self {
        self.config.availability.cancelled_events_block = block;
        self
    }

    pub fn morning_band(mut self, start: u32, end: u32) -> Self {
        self.config.scoring.morning_band_start = start;
        self.config.scoring.morning_band_end = end;
        self
    }

    pub fn day(mut self, day: NaiveDate) -> Self {
        self.config.general.day = Some(day);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.general.verbose = verbose;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
