pub mod builtin;
pub mod custom;

use crate::error::Result;
use crate::types::config::{CriterionSettings, UrgencyConfig, BUILTIN_CRITERIA};
use crate::types::report::UpdateSet;
use crate::types::scoring::Weight;
use chrono::{DateTime, Utc};

pub trait Criterion {
    fn name(&self) -> &str;

    /// Abbreviation used by compact output formats.
    fn short_code(&self) -> String {
        self.name().chars().take(2).collect()
    }

    fn is_fulfilled(&self, settings: &CriterionSettings, updates: &UpdateSet) -> Result<bool>;
}

pub struct RegisteredCriterion {
    criterion: Box<dyn Criterion>,
    settings: CriterionSettings,
}

impl RegisteredCriterion {
    pub fn name(&self) -> &str {
        self.criterion.name()
    }

    pub fn short_code(&self) -> String {
        self.criterion.short_code()
    }

    pub fn weight(&self) -> Weight {
        self.settings.weight
    }

    pub fn evaluate(&self, updates: &UpdateSet) -> Result<bool> {
        self.criterion.is_fulfilled(&self.settings, updates)
    }
}

/// Ordered criteria: built-ins first, then custom criteria; the first registration of a name wins.
#[derive(Default)]
pub struct CriteriaRegistry {
    entries: Vec<RegisteredCriterion>,
}

impl CriteriaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-ins plus the enabled executables found in the configured criteria directory.
    pub fn from_config(
        config: &UrgencyConfig,
        last_upgrade: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut registry = Self::with_builtins(config, last_upgrade, now);
        if let Some(dir) = config.criteria_dir_path() {
            for external in custom::discover(&dir, config) {
                let settings = config.criterion_settings(external.name());
                tracing::debug!(
                    criterion = external.name(),
                    path = %external.path().display(),
                    "loaded custom criterion"
                );
                registry.register(Box::new(external), settings);
            }
        }
        tracing::debug!(count = registry.len(), "criteria registered");
        registry
    }

    pub fn with_builtins(
        config: &UrgencyConfig,
        last_upgrade: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_CRITERIA {
            let criterion: Box<dyn Criterion> = match name {
                "available" => Box::new(builtin::Available),
                "count" => Box::new(builtin::Count),
                "critical" => Box::new(builtin::Critical),
                _ => Box::new(builtin::LastUpdate::new(last_upgrade, now)),
            };
            registry.register(criterion, config.criterion_settings(name));
        }
        registry
    }

    /// Returns false when the name is already taken; the earlier registration is kept.
    pub fn register(&mut self, criterion: Box<dyn Criterion>, settings: CriterionSettings) -> bool {
        if self
            .entries
            .iter()
            .any(|entry| entry.name() == criterion.name())
        {
            tracing::warn!(
                criterion = criterion.name(),
                "duplicate criterion name, keeping the first registration"
            );
            return false;
        }
        self.entries.push(RegisteredCriterion {
            criterion,
            settings,
        });
        true
    }

    /// Registered criteria with a non-zero weight, in registration order.
    pub fn active_criteria(&self) -> Vec<&RegisteredCriterion> {
        self.entries
            .iter()
            .filter(|entry| entry.weight() > 0)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
