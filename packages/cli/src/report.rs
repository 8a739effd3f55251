//! Plain-text rendering of command output.

use std::fmt::Write as _;

use sanitation_formula::{ComplaintScore, InspectionScore};
use sanitation_geography_models::{DateRange, NodeId};

use crate::coverage::{CoverageReport, Domain};
use crate::funds::FundSummary;
use crate::schemes::SchemeReport;

fn range_label(range: &DateRange) -> String {
    let bound = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "*".to_string(), |d| d.to_string());
    format!("{} .. {}", bound(range.start), bound(range.end))
}

fn not_found_line(out: &mut String, ids: &[NodeId]) {
    if !ids.is_empty() {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "\nNot found: {}", ids.join(", "));
    }
}

#[must_use]
pub fn coverage_table(report: &CoverageReport) -> String {
    // Contract amounts are summed, not averaged.
    let score_label = match report.domain {
        Domain::Inspection => "AVG SCORE",
        Domain::Survey => "AVG RATE",
        Domain::Contractor => "TOTAL CR",
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:?} coverage at {} level ({})",
        report.domain,
        report.level,
        range_label(&report.range)
    );
    let _ = writeln!(
        out,
        "{:<12} {:>9} {:>9} {:>10} {:>10} {:>9} {:>9}",
        "ID", "COVERED", "TOTAL", "COVERAGE%", score_label, "CHILDREN", "RECORDS"
    );
    let _ = writeln!(out, "{}", "-".repeat(74));

    for result in &report.results {
        let children = format!("{}/{}", result.covered_child_nodes, result.child_nodes);
        let score = report.domain.headline(result);
        let _ = writeln!(
            out,
            "{:<12} {:>9} {:>9} {:>10} {:>10} {:>9} {:>9}",
            result.node_id,
            result.covered_children,
            result.total_children,
            result.coverage_percentage,
            score,
            children,
            result.record_count
        );
    }

    if !report.ranking.is_empty() {
        let _ = writeln!(out, "\nTop {}:", report.ranking.len());
        for entry in &report.ranking {
            let _ = writeln!(out, "{:>4}. {:<12} {:>10}", entry.rank, entry.key, entry.score);
        }
    }

    not_found_line(&mut out, &report.not_found);
    let _ = write!(out, "\n{} node(s)", report.results.len());
    out
}

#[must_use]
pub fn scheme_table(report: &SchemeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Survey schemes ({})", range_label(&report.range));

    for summary in &report.results {
        let _ = writeln!(
            out,
            "\n{} {}: {} survey(s) across {} village(s), overall {}%",
            summary.level, summary.node_id, summary.surveys, summary.villages, summary.overall_rate
        );
        for (scheme, rate) in &summary.schemes {
            let _ = writeln!(out, "  {:<12} {:>7}%", scheme.to_string(), rate);
        }
    }

    not_found_line(&mut out, &report.not_found);
    let _ = write!(out, "\n{} node(s)", report.results.len());
    out
}

#[must_use]
pub fn fund_table(summary: &FundSummary) -> String {
    format!(
        "{:<20} {:>12}\n{:<20} {:>12}\n{:<20} {:>11}%\n{:<20} {:>12}",
        "Sanctioned (Cr)",
        summary.funds_sanctioned_crores,
        "Work orders (Cr)",
        summary.work_order_crores,
        "Utilization",
        summary.utilization_rate,
        "Cost / household",
        summary.cost_per_household
    )
}

#[must_use]
pub fn inspection_table(score: &InspectionScore) -> String {
    let rows = [
        ("Household waste", score.household_waste),
        ("Road cleaning", score.road_cleaning),
        ("Drain cleaning", score.drain_cleaning),
        ("Community sanitation", score.community_sanitation),
        ("Other", score.other),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<22} {value:>7}%");
    }
    let _ = write!(
        out,
        "{:<22} {:>7}% ({}/{} points)",
        "Overall", score.overall, score.total_points, score.max_points
    );
    out
}

#[must_use]
pub fn complaint_table(score: &ComplaintScore) -> String {
    format!(
        "{:<16} {:>7}\n{:<16} {:>7}\n{:<16} {:>7}",
        "Resolution time",
        score.resolution_time_score,
        "Resolution rate",
        score.resolution_rate_score,
        "Total",
        score.total
    )
}
