pub mod json;
pub mod template;
pub mod text;

use crate::error::UrgencyError;
use crate::types::report::ScoreReport;
use chrono::SecondsFormat;
use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Fancy,
    Json,
    I3status,
    Custom,
}

/// Display values derived from a report; the closed set of custom-format placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatFields {
    pub available_updates: String,
    pub last_update: String,
    pub matched_criteria: String,
    pub matched_criteria_short: String,
    pub score: u32,
    pub status_text: String,
    pub update_count: usize,
}

impl FormatFields {
    pub fn from_report(report: &ScoreReport) -> Self {
        Self {
            available_updates: report.updates.names().join(", "),
            last_update: report
                .checked_at
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            matched_criteria: report.matched_names().join(", "),
            matched_criteria_short: report.matched_short().join(","),
            score: report.score,
            status_text: report.level.status_text().to_string(),
            update_count: report.update_count(),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "available_updates" => Some(self.available_updates.clone()),
            "last_update" => Some(self.last_update.clone()),
            "matched_criteria" => Some(self.matched_criteria.clone()),
            "matched_criteria_short" => Some(self.matched_criteria_short.clone()),
            "score" => Some(self.score.to_string()),
            "status_text" => Some(self.status_text.clone()),
            "update_count" => Some(self.update_count.to_string()),
            _ => None,
        }
    }
}

pub fn render(
    report: &ScoreReport,
    format: OutputFormat,
    custom_format: &str,
) -> Result<String, UrgencyError> {
    match format {
        OutputFormat::Plain => Ok(text::to_plain(report)),
        OutputFormat::Fancy => Ok(text::to_fancy(report, io::stdout().is_terminal())),
        OutputFormat::Json => json::to_json(report).map_err(UrgencyError::Json),
        OutputFormat::I3status => json::to_i3status(report).map_err(UrgencyError::Json),
        OutputFormat::Custom => Ok(template::substitute(
            custom_format,
            &FormatFields::from_report(report),
        )),
    }
}
