//! Headline counters over the full report list.

use serde::Serialize;
use triage_report_models::{Report, ReportStatus, SeverityLabel};

/// The four metric cards shown above the report table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// All reports.
    pub total: usize,
    /// Reports labelled Critical.
    pub critical: usize,
    /// Reports that are Pending or Needs Review.
    pub pending: usize,
    /// Reports that are Resolved.
    pub resolved: usize,
}

/// Summarizes `reports`.
///
/// Callers pass the whole store, never the filtered table rows, so the
/// cards do not move when the operator filters.
#[must_use]
pub fn summarize(reports: &[Report]) -> Summary {
    reports.iter().fold(
        Summary {
            total: reports.len(),
            ..Summary::default()
        },
        |mut acc, r| {
            if r.severity_label == SeverityLabel::Critical {
                acc.critical += 1;
            }
            if r.status.is_awaiting_verification() {
                acc.pending += 1;
            }
            if r.status == ReportStatus::Resolved {
                acc.resolved += 1;
            }
            acc
        },
    )
}
