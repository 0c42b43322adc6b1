//! Filter engine: narrows the report list for table display.
//!
//! Filtering is a pure, order-preserving function of the report list and
//! the [`FilterState`]. It never touches the store, and headline metrics
//! are always computed from the unfiltered list.

use triage_report_models::{FilterState, Report};

/// Whether `report` passes every set field of `filter`.
///
/// - severity: exact match on `severity_label`
/// - status: exact match on `status`
/// - emergency type: case-insensitive substring of `emergency_type`
#[must_use]
pub fn matches(report: &Report, filter: &FilterState) -> bool {
    filter
        .severity
        .is_none_or(|severity| report.severity_label == severity)
        && filter.status.is_none_or(|status| report.status == status)
        && filter.emergency_type.as_deref().is_none_or(|needle| {
            report
                .emergency_type
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
}

/// Returns the reports passing `filter`, in their original order.
#[must_use]
pub fn apply<'a>(reports: &'a [Report], filter: &FilterState) -> Vec<&'a Report> {
    if filter.is_unset() {
        return reports.iter().collect();
    }
    reports.iter().filter(|r| matches(r, filter)).collect()
}
