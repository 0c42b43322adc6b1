#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics projection types returned by `GET /reports/analytics`.
//!
//! The projection is computed server-side on its own schedule. It is an
//! independent snapshot of the report population and is never expected to
//! add up to the live report list the console holds. Every series is
//! optional on the wire: a missing or `null` series decodes as empty.

use serde::{Deserialize, Deserializer, Serialize};
use triage_report_models::SeverityLabel;

/// Fill color for [`SeverityLabel::Low`].
pub const LOW_COLOR: &str = "#2bb673";
/// Fill color for [`SeverityLabel::Medium`].
pub const MEDIUM_COLOR: &str = "#f6a623";
/// Fill color for [`SeverityLabel::Critical`].
pub const CRITICAL_COLOR: &str = "#e84a5f";
/// Fill color for any severity category outside the known labels.
pub const NEUTRAL_COLOR: &str = "#999999";

/// A named count, used for per-type, per-severity, and per-status series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    /// Category name as sent by the server.
    pub name: String,
    /// Number of reports in the category.
    pub value: u64,
}

/// Report count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Day in `YYYY-MM-DD` form.
    pub day: String,
    /// Number of reports submitted that day.
    pub value: u64,
}

/// A citizen account the server flagged for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedUser {
    /// Account identifier.
    pub id: i64,
    /// Account email.
    pub email: String,
    /// Upstream-computed risk score.
    pub risk_score: f64,
}

/// The server-computed chart series.
///
/// Replaced wholesale on every fetch, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsProjection {
    /// Report counts per emergency type.
    #[serde(default, deserialize_with = "nullable_series")]
    pub reports_per_type: Vec<NamedCount>,
    /// Report counts per severity label.
    #[serde(default, deserialize_with = "nullable_series")]
    pub severity_distribution: Vec<NamedCount>,
    /// Daily report counts, chronological.
    #[serde(default, deserialize_with = "nullable_series")]
    pub reports_over_time: Vec<DailyCount>,
    /// Accounts flagged for review, highest risk first.
    #[serde(default, deserialize_with = "nullable_series")]
    pub flagged_users: Vec<FlaggedUser>,
    /// Report counts per lifecycle status.
    #[serde(default, deserialize_with = "nullable_series")]
    pub status_distribution: Vec<NamedCount>,
}

impl AnalyticsProjection {
    /// Whether the four primary series are all empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports_per_type.is_empty()
            && self.severity_distribution.is_empty()
            && self.reports_over_time.is_empty()
            && self.flagged_users.is_empty()
    }
}

/// Returns the fill color for a severity-distribution category.
///
/// Category names come from the server and are matched case-sensitively
/// against the known labels. Anything else gets [`NEUTRAL_COLOR`].
#[must_use]
pub fn severity_color(name: &str) -> &'static str {
    match name.parse::<SeverityLabel>() {
        Ok(SeverityLabel::Low) => LOW_COLOR,
        Ok(SeverityLabel::Medium) => MEDIUM_COLOR,
        Ok(SeverityLabel::Critical) => CRITICAL_COLOR,
        Err(_) => NEUTRAL_COLOR,
    }
}

fn nullable_series<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
