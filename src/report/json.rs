use crate::types::report::{ScoreReport, UrgencyLevel};
use serde_json::json;

pub fn to_json(report: &ScoreReport) -> Result<String, serde_json::Error> {
    let payload = json!({
        "count": report.update_count(),
        "text_value": report.level.status_text(),
        "score": report.score,
    });
    serde_json::to_string(&payload)
}

/// Block for i3status-rust's custom block (`json = true`).
pub fn to_i3status(report: &ScoreReport) -> Result<String, serde_json::Error> {
    let (state, text) = match report.level {
        UrgencyLevel::None | UrgencyLevel::Available => ("Idle", String::new()),
        UrgencyLevel::Warning => ("Warning", report.matched_short().join(",")),
        UrgencyLevel::Critical => ("Critical", report.matched_short().join(",")),
    };
    let payload = json!({
        "icon": "archive",
        "state": state,
        "text": text,
    });
    serde_json::to_string(&payload)
}
