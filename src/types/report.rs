use crate::types::scoring::{Score, Weight};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Package names reported as upgradable, in lister output order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct UpdateSet(Vec<String>);

impl UpdateSet {
    pub fn parse(raw: &str) -> Self {
        Self::from_names(raw.split_whitespace())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for name in names {
            let name = name.into();
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }
            ordered.push(name);
        }
        Self(ordered)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for UpdateSet {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<UpdateSet> for Vec<String> {
    fn from(set: UpdateSet) -> Self {
        set.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    None,
    Available,
    Warning,
    Critical,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Available => "available",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn status_text(self) -> &'static str {
        match self {
            Self::None => "Ok",
            Self::Available => "Updates available",
            Self::Warning => "Updates recommended",
            Self::Critical => "Updates required",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::None => "green",
            Self::Available => "blue",
            Self::Warning => "yellow",
            Self::Critical => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedCriterion {
    pub name: String,
    pub short: String,
    pub weight: Weight,
}

/// Outcome of one scoring pass; the unit handed to rendering and persisted as state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: Score,
    pub level: UrgencyLevel,
    pub matched: Vec<MatchedCriterion>,
    pub updates: UpdateSet,
    pub checked_at: DateTime<Utc>,
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

impl ScoreReport {
    pub fn matched_names(&self) -> Vec<&str> {
        self.matched
            .iter()
            .map(|criterion| criterion.name.as_str())
            .collect()
    }

    pub fn matched_short(&self) -> Vec<&str> {
        self.matched
            .iter()
            .map(|criterion| criterion.short.as_str())
            .collect()
    }

    pub fn update_count(&self) -> usize {
        self.updates.len()
    }
}
