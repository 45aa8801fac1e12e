use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::IndustryMode;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Day-of-week field for a cron expression (Sunday = 0).
    #[must_use]
    pub fn cron_index(self) -> u8 {
        match self {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default = "default_day")]
    pub day: Weekday,
    #[serde(default = "default_hour")]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            day: default_day(),
            hour: default_hour(),
            minute: 0,
        }
    }
}

impl Schedule {
    /// Weekly cron expression, `minute hour * * day`.
    #[must_use]
    pub fn cron(&self) -> String {
        format!("{} {} * * {}", self.minute, self.hour, self.day.cron_index())
    }
}

fn default_day() -> Weekday {
    Weekday::Monday
}

fn default_hour() -> u8 {
    9
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustrySelection {
    #[default]
    AutoDiscover,
    Manual,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub mode: IndustrySelection,
    /// Comma-separated list used in `manual` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<String>,
    /// Comma-separated list added to discovered industries in `hybrid` mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_industries: Option<String>,
    #[serde(default)]
    pub slack_enabled: bool,
}

impl AutomationConfig {
    /// The run-time industry mode this configuration selects.
    #[must_use]
    pub fn industry_mode(&self) -> IndustryMode {
        match self.mode {
            IndustrySelection::AutoDiscover => IndustryMode::Auto,
            IndustrySelection::Manual => {
                IndustryMode::Manual(split_industries(self.industries.as_deref().unwrap_or("")))
            }
            IndustrySelection::Hybrid => IndustryMode::Hybrid(split_industries(
                self.add_industries.as_deref().unwrap_or(""),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutomationFile {
    #[serde(default)]
    pub automation: AutomationConfig,
}

/// Split a comma-separated industry list, trimming blanks and dropping
/// case-insensitive duplicates while keeping first-seen order.
#[must_use]
pub fn split_industries(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Load and validate the automation configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_automation(path: &Path) -> Result<AutomationFile, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::AutomationFileIo {
            path: path.display().to_string(),
            source: e,
        })?;

    let file: AutomationFile = serde_yaml::from_str(&content)?;
    validate_automation(&file.automation)?;
    Ok(file)
}

fn validate_automation(config: &AutomationConfig) -> Result<(), ConfigError> {
    if config.schedule.hour > 23 {
        return Err(ConfigError::Validation(format!(
            "schedule hour {} is out of range 0-23",
            config.schedule.hour
        )));
    }
    if config.schedule.minute > 59 {
        return Err(ConfigError::Validation(format!(
            "schedule minute {} is out of range 0-59",
            config.schedule.minute
        )));
    }
    if config.locations.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "locations must be non-empty strings".to_string(),
        ));
    }
    if config.enabled && config.locations.is_empty() {
        return Err(ConfigError::Validation(
            "automation is enabled but no locations are configured".to_string(),
        ));
    }
    if config.mode == IndustrySelection::Manual
        && split_industries(config.industries.as_deref().unwrap_or("")).is_empty()
    {
        return Err(ConfigError::Validation(
            "manual mode requires a non-empty industries list".to_string(),
        ));
    }
    Ok(())
}
