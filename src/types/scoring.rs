use crate::error::{Result, UrgencyError};
use crate::types::report::UrgencyLevel;
use serde::{Deserialize, Serialize};

pub type Score = u32;
pub type Weight = u32;

/// Inclusive lower bounds of the urgency levels above `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub available: Score,
    pub warning: Score,
    pub critical: Score,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            available: 1,
            warning: 2,
            critical: 3,
        }
    }
}

impl Thresholds {
    #[cfg(test)]
    pub fn new(available: Score, warning: Score, critical: Score) -> Result<Self> {
        let thresholds = Self {
            available,
            warning,
            critical,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.available < self.warning && self.warning < self.critical {
            return Ok(());
        }
        Err(UrgencyError::Config(format!(
            "thresholds must strictly increase (available < warning < critical), found {} / {} / {}",
            self.available, self.warning, self.critical
        )))
    }

    pub fn resolve_level(&self, score: Score) -> UrgencyLevel {
        if score >= self.critical {
            UrgencyLevel::Critical
        } else if score >= self.warning {
            UrgencyLevel::Warning
        } else if score >= self.available {
            UrgencyLevel::Available
        } else {
            UrgencyLevel::None
        }
    }
}
