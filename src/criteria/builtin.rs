use crate::criteria::Criterion;
use crate::error::{Result, UrgencyError};
use crate::types::config::CriterionSettings;
use crate::types::report::UpdateSet;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Any update at all.
pub struct Available;

impl Criterion for Available {
    fn name(&self) -> &str {
        "available"
    }

    fn is_fulfilled(&self, _settings: &CriterionSettings, updates: &UpdateSet) -> Result<bool> {
        Ok(!updates.is_empty())
    }
}

/// At least `count_threshold` pending updates.
pub struct Count;

impl Criterion for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn is_fulfilled(&self, settings: &CriterionSettings, updates: &UpdateSet) -> Result<bool> {
        let threshold = settings.get_u64("threshold")?;
        Ok(updates.len() as u64 >= threshold)
    }
}

/// Any pending package name matching `critical_pattern` (unanchored search).
pub struct Critical;

impl Criterion for Critical {
    fn name(&self) -> &str {
        "critical"
    }

    fn is_fulfilled(&self, settings: &CriterionSettings, updates: &UpdateSet) -> Result<bool> {
        let pattern = settings.get_str("pattern")?;
        let regex = Regex::new(pattern)
            .map_err(|e| UrgencyError::criterion(self.name(), format!("invalid pattern: {e}")))?;
        Ok(updates.iter().any(|name| regex.is_match(name)))
    }
}

/// Time since the system was last seen fully upgraded exceeds `lastupdate_age_hours`.
pub struct LastUpdate {
    last_upgrade: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl LastUpdate {
    pub fn new(last_upgrade: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self { last_upgrade, now }
    }
}

impl Criterion for LastUpdate {
    fn name(&self) -> &str {
        "lastupdate"
    }

    fn is_fulfilled(&self, settings: &CriterionSettings, _updates: &UpdateSet) -> Result<bool> {
        let age_hours = settings.get_u64("age_hours")?;
        let max_age = i64::try_from(age_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                UrgencyError::criterion(self.name(), format!("age of {age_hours}h is out of range"))
            })?;
        match self.last_upgrade {
            Some(last) => Ok(self.now.signed_duration_since(last) > max_age),
            None => Ok(true),
        }
    }
}
