//! Complaint exports for `complaint-score --complaints`.

use std::path::Path;

use chrono::{DateTime, Utc};
use sanitation_formula::ComplaintStats;
use serde::Deserialize;

/// One complaint as exported by the grievance portal.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplaintRow {
    created_at: DateTime<Utc>,
    #[serde(default)]
    resolved_at: Option<DateTime<Utc>>,
}

/// Counts a JSON array of complaints.
pub fn stats_from_json(json: &str) -> Result<ComplaintStats, serde_json::Error> {
    let rows: Vec<ComplaintRow> = serde_json::from_str(json)?;
    Ok(ComplaintStats::from_timestamps(
        rows.into_iter().map(|r| (r.created_at, r.resolved_at)),
    ))
}

pub fn load(path: &Path) -> Result<ComplaintStats, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let stats = stats_from_json(&json)
        .map_err(|e| format!("Invalid complaints {}: {e}", path.display()))?;
    log::debug!(
        "Loaded {} complaints ({} resolved) from {}",
        stats.total,
        stats.resolved,
        path.display()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sanitation_formula::ScoringRubric;

    #[test]
    fn open_complaints_count_toward_the_rate_only() {
        let stats = stats_from_json(
            r#"[
                {"createdAt": "2025-04-01T08:00:00Z", "resolvedAt": "2025-04-02T08:00:00Z"},
                {"createdAt": "2025-04-01T09:00:00Z", "resolvedAt": "2025-04-04T09:00:00Z"},
                {"createdAt": "2025-04-03T10:00:00Z"},
                {"createdAt": "2025-04-05T10:00:00Z", "resolvedAt": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.total_resolution_seconds, 4 * 86_400);

        let rubric = ScoringRubric::standard();
        assert_eq!(stats.average_resolution_seconds(rubric), dec!(172800));
        let score = stats.score(rubric);
        assert_eq!(score.resolution_time_score, dec!(35.71));
        assert_eq!(score.resolution_rate_score, dec!(25.00));
        assert_eq!(score.total, dec!(60.71));
    }

    #[test]
    fn empty_export_scores_nothing() {
        let stats = stats_from_json("[]").unwrap();
        assert_eq!(stats, ComplaintStats::default());
        assert_eq!(stats.score(ScoringRubric::standard()).resolution_rate_score, dec!(0));
    }

    #[test]
    fn missing_creation_time_is_rejected() {
        assert!(stats_from_json(r#"[{"resolvedAt": "2025-04-02T08:00:00Z"}]"#).is_err());
    }
}
