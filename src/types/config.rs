use crate::error::{Result, UrgencyError};
use crate::types::report::UrgencyLevel;
use crate::types::scoring::{Thresholds, Weight};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use toml::{Table, Value};

pub const APP_DIR: &str = "update-urgency";

pub const BUILTIN_CRITERIA: [&str; 4] = ["available", "count", "critical", "lastupdate"];

#[derive(Debug, Clone, Deserialize)]
pub struct UrgencyConfig {
    #[serde(default = "default_cmd_available")]
    pub cmd_available: String,
    pub cmd_no_updates_exit_code: Option<i32>,
    #[serde(default = "default_cache_min_age")]
    pub cache_min_age_minutes: u64,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_criteria")]
    pub criteria: Table,
    #[serde(default = "default_custom_format")]
    pub custom_format: String,
    pub state_file: Option<PathBuf>,
    pub criteria_dir: Option<PathBuf>,
    pub notification: Option<NotificationConfig>,
}

fn default_cmd_available() -> String {
    "pacman -Quq".to_string()
}

fn default_cache_min_age() -> u64 {
    30
}

fn default_custom_format() -> String {
    "$status_text: $available_updates".to_string()
}

pub fn default_criteria() -> Table {
    let mut criteria = Table::new();
    criteria.insert("available_weight".to_string(), Value::Integer(1));
    criteria.insert("count_weight".to_string(), Value::Integer(1));
    criteria.insert("count_threshold".to_string(), Value::Integer(15));
    criteria.insert("critical_weight".to_string(), Value::Integer(1));
    criteria.insert(
        "critical_pattern".to_string(),
        Value::String("^archlinux-keyring$|^linux$|^pacman.*$".to_string()),
    );
    criteria.insert("lastupdate_weight".to_string(), Value::Integer(1));
    criteria.insert("lastupdate_age_hours".to_string(), Value::Integer(168));
    criteria
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationUrgency {
    Low,
    Normal,
    Critical,
}

impl NotificationUrgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    pub urgency: Option<NotificationUrgency>,
    #[serde(default = "default_notification_threshold")]
    pub threshold: UrgencyLevel,
}

fn default_app_name() -> String {
    APP_DIR.to_string()
}

fn default_icon() -> String {
    "software-update-available".to_string()
}

fn default_title() -> String {
    "$status_text".to_string()
}

fn default_message() -> String {
    "$available_updates".to_string()
}

fn default_timeout() -> u32 {
    5000
}

fn default_notification_threshold() -> UrgencyLevel {
    UrgencyLevel::Available
}

/// Settings slice handed to exactly one criterion, keys stripped of the `<name>_` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionSettings {
    pub name: String,
    pub weight: Weight,
    pub values: Table,
}

impl CriterionSettings {
    pub fn new(name: &str, weight: Weight) -> Self {
        Self {
            name: name.to_string(),
            weight,
            values: Table::new(),
        }
    }

    #[cfg(test)]
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get_u64(&self, key: &str) -> Result<u64> {
        let value = self.require(key)?;
        value
            .as_integer()
            .and_then(|raw| u64::try_from(raw).ok())
            .ok_or_else(|| {
                UrgencyError::criterion(
                    &self.name,
                    format!("setting {}_{key} must be a non-negative integer", self.name),
                )
            })
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| {
            UrgencyError::criterion(
                &self.name,
                format!("setting {}_{key} must be a string", self.name),
            )
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("weight".to_string(), serde_json::Value::from(self.weight));
        for (key, value) in &self.values {
            let converted = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
            object.insert(key.clone(), converted);
        }
        serde_json::Value::Object(object)
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.values.get(key).ok_or_else(|| {
            UrgencyError::criterion(
                &self.name,
                format!("missing setting {}_{key}", self.name),
            )
        })
    }
}

impl UrgencyConfig {
    pub fn state_file_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.state_file {
            return Ok(path.clone());
        }
        dirs::state_dir()
            .map(|dir| dir.join(APP_DIR).join("state.json"))
            .ok_or_else(|| {
                UrgencyError::Config(
                    "unable to determine state directory; set state_file".to_string(),
                )
            })
    }

    pub fn criteria_dir_path(&self) -> Option<PathBuf> {
        self.criteria_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR).join("criteria")))
    }

    /// Criterion names referenced by any `<name>_<setting>` key.
    pub fn criterion_names(&self) -> BTreeSet<String> {
        self.criteria
            .keys()
            .filter_map(|key| key.split_once('_').map(|(name, _)| name.to_string()))
            .collect()
    }

    pub fn weight(&self, name: &str) -> Weight {
        self.criteria
            .get(&format!("{name}_weight"))
            .and_then(Value::as_integer)
            .and_then(|raw| Weight::try_from(raw).ok())
            .unwrap_or(0)
    }

    pub fn criterion_settings(&self, name: &str) -> CriterionSettings {
        let prefix = format!("{name}_");
        let mut settings = CriterionSettings::new(name, self.weight(name));
        for (key, value) in &self.criteria {
            let Some(setting) = key.strip_prefix(&prefix) else {
                continue;
            };
            if setting == "weight" || setting.is_empty() {
                continue;
            }
            settings.values.insert(setting.to_string(), value.clone());
        }
        settings
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;

        let malformed = self
            .criteria
            .keys()
            .filter(|key| {
                key.split_once('_')
                    .map(|(name, setting)| name.is_empty() || setting.is_empty())
                    .unwrap_or(true)
            })
            .cloned()
            .collect::<Vec<_>>();
        if !malformed.is_empty() {
            return Err(UrgencyError::Config(format!(
                "criteria keys must look like <name>_<setting>: {}",
                malformed.join(", ")
            )));
        }

        let missing_weights = self
            .criterion_names()
            .into_iter()
            .filter(|name| !self.criteria.contains_key(&format!("{name}_weight")))
            .collect::<Vec<_>>();
        if !missing_weights.is_empty() {
            return Err(UrgencyError::Config(format!(
                "missing weight for criteria: {}",
                missing_weights.join(", ")
            )));
        }

        for name in self.criterion_names() {
            let key = format!("{name}_weight");
            let valid = self
                .criteria
                .get(&key)
                .and_then(Value::as_integer)
                .map(|raw| Weight::try_from(raw).is_ok())
                .unwrap_or(false);
            if !valid {
                return Err(UrgencyError::Config(format!(
                    "criteria.{key} must be a non-negative integer"
                )));
            }
        }

        for key in ["count_threshold", "lastupdate_age_hours"] {
            if let Some(value) = self.criteria.get(key) {
                let valid = value.as_integer().map(|raw| raw >= 0).unwrap_or(false);
                if !valid {
                    return Err(UrgencyError::Config(format!(
                        "criteria.{key} must be a non-negative integer"
                    )));
                }
            }
        }

        if let Some(value) = self.criteria.get("critical_pattern") {
            let pattern = value.as_str().ok_or_else(|| {
                UrgencyError::Config("criteria.critical_pattern must be a string".to_string())
            })?;
            Regex::new(pattern).map_err(|e| {
                UrgencyError::Config(format!("criteria.critical_pattern is not a valid regex: {e}"))
            })?;
        }

        if let Some(notification) = &self.notification {
            if notification.threshold == UrgencyLevel::None {
                return Err(UrgencyError::Config(
                    "notification.threshold must be one of available, warning, critical"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}
