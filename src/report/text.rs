use crate::types::report::ScoreReport;

pub fn to_plain(report: &ScoreReport) -> String {
    report.level.status_text().to_string()
}

/// Status text in the level colour; plain when `color` is off.
pub fn to_fancy(report: &ScoreReport, color: bool) -> String {
    if !color {
        return to_plain(report);
    }
    format!(
        "\x1b[{}m{}\x1b[0m",
        ansi_code(report.level.color()),
        report.level.status_text()
    )
}

fn ansi_code(color: &str) -> u8 {
    match color {
        "red" => 31,
        "green" => 32,
        "yellow" => 33,
        "blue" => 34,
        _ => 39,
    }
}
