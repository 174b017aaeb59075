use crate::criteria::CriteriaRegistry;
use crate::types::report::{MatchedCriterion, ScoreReport, UpdateSet};
use crate::types::scoring::{Score, Thresholds};
use chrono::{DateTime, Utc};

/// Evaluate every active criterion in registry order and resolve the urgency level.
///
/// A criterion that fails to evaluate counts as not fulfilled; its error is
/// kept in `diagnostics` and the remaining criteria are still scored.
pub fn score(
    updates: &UpdateSet,
    registry: &CriteriaRegistry,
    thresholds: &Thresholds,
    checked_at: DateTime<Utc>,
) -> ScoreReport {
    let mut total: Score = 0;
    let mut matched = Vec::new();
    let mut diagnostics = Vec::new();

    for criterion in registry.active_criteria() {
        match criterion.evaluate(updates) {
            Ok(true) => {
                total = total.saturating_add(criterion.weight());
                matched.push(MatchedCriterion {
                    name: criterion.name().to_string(),
                    short: criterion.short_code(),
                    weight: criterion.weight(),
                });
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(criterion = criterion.name(), error = %e, "criterion evaluation failed");
                diagnostics.push(e.to_string());
            }
        }
    }

    let level = thresholds.resolve_level(total);
    tracing::info!(score = total, level = level.as_str(), "scored available updates");

    ScoreReport {
        score: total,
        level,
        matched,
        updates: updates.clone(),
        checked_at,
        diagnostics,
    }
}
