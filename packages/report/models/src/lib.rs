#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency report records, lifecycle statuses, and filter state.
//!
//! This crate defines the report record shape returned by the reports API
//! along with the closed value sets the console relies on: the three
//! severity labels, the six lifecycle statuses, and the four statuses an
//! operator may assign. Free-text status strings never leave this crate;
//! everything is parsed into [`ReportStatus`] or [`TransitionTarget`] first.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity label assigned to a report by the upstream classifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SeverityLabel {
    /// Minor incident, no immediate danger.
    Low,
    /// Incident requiring attention but not life-threatening.
    Medium,
    /// Life-threatening incident.
    Critical,
}

impl SeverityLabel {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::Critical]
    }
}

/// Lifecycle status of a report.
///
/// New reports enter as [`Self::Pending`] or [`Self::NeedsReview`]
/// (decided by the ingestion service). Operators may then move a report to
/// any [`TransitionTarget`] regardless of its current status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ReportStatus {
    /// Awaiting operator verification.
    Pending,
    /// Flagged by image verification as suspicious.
    #[serde(rename = "Needs Review")]
    #[strum(serialize = "Needs Review")]
    NeedsReview,
    /// Confirmed genuine by an operator.
    Verified,
    /// Responders have been sent.
    Dispatched,
    /// Incident closed.
    Resolved,
    /// Discarded as false or abusive.
    Rejected,
}

impl ReportStatus {
    /// Returns all variants of this enum, in lifecycle order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pending,
            Self::NeedsReview,
            Self::Verified,
            Self::Dispatched,
            Self::Resolved,
            Self::Rejected,
        ]
    }

    /// Whether the report still awaits verification.
    #[must_use]
    pub const fn is_awaiting_verification(self) -> bool {
        matches!(self, Self::Pending | Self::NeedsReview)
    }
}

/// A status an operator is allowed to assign.
///
/// Every report exposes exactly these four targets no matter what its
/// current status is. There is no adjacency restriction and no terminal
/// state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TransitionTarget {
    /// Mark the report as verified.
    Verified,
    /// Mark responders as dispatched.
    Dispatched,
    /// Close the incident.
    Resolved,
    /// Reject the report.
    Rejected,
}

impl TransitionTarget {
    /// Returns all variants of this enum, in the order the actions are shown.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Verified,
            Self::Dispatched,
            Self::Resolved,
            Self::Rejected,
        ]
    }

    /// The lifecycle status this target assigns.
    #[must_use]
    pub const fn status(self) -> ReportStatus {
        match self {
            Self::Verified => ReportStatus::Verified,
            Self::Dispatched => ReportStatus::Dispatched,
            Self::Resolved => ReportStatus::Resolved,
            Self::Rejected => ReportStatus::Rejected,
        }
    }
}

impl From<TransitionTarget> for ReportStatus {
    fn from(target: TransitionTarget) -> Self {
        target.status()
    }
}

/// Error returned when a status is not one an operator may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotATransitionTargetError {
    /// The status that was rejected.
    pub status: ReportStatus,
}

impl std::fmt::Display for NotATransitionTargetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "status '{}' cannot be assigned by an operator",
            self.status
        )
    }
}

impl std::error::Error for NotATransitionTargetError {}

impl TryFrom<ReportStatus> for TransitionTarget {
    type Error = NotATransitionTargetError;

    fn try_from(status: ReportStatus) -> Result<Self, Self::Error> {
        match status {
            ReportStatus::Verified => Ok(Self::Verified),
            ReportStatus::Dispatched => Ok(Self::Dispatched),
            ReportStatus::Resolved => Ok(Self::Resolved),
            ReportStatus::Rejected => Ok(Self::Rejected),
            ReportStatus::Pending | ReportStatus::NeedsReview => {
                Err(NotATransitionTargetError { status })
            }
        }
    }
}

/// A citizen-submitted emergency report as returned by `GET /reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Server-assigned identifier, unique and immutable.
    pub id: i64,
    /// Submission time as sent by the server (ISO 8601, usually naive UTC).
    pub created_at: String,
    /// Last modification time, when the server includes it.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Email of the submitting citizen.
    pub reporter_email: String,
    /// Free-text emergency category (e.g. "Fire", "Flood").
    pub emergency_type: String,
    /// Free-text narrative.
    pub description: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Severity label from the classifier.
    pub severity_label: SeverityLabel,
    /// Classifier confidence for [`Self::severity_label`].
    pub severity_confidence: f64,
    /// Image verification trust score.
    pub verification_score: f64,
    /// Whether verification marked the report as suspicious.
    #[serde(deserialize_with = "deserialize_flag")]
    pub suspicious: bool,
    /// Lifecycle status.
    pub status: ReportStatus,
    /// Server-relative path of the reporter selfie.
    pub selfie_url: String,
    /// Server-relative path of the incident photo.
    pub accident_url: String,
    /// Device that submitted the report.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Risk score of the reporting account.
    #[serde(default)]
    pub risk_score: Option<f64>,
    /// Whether the reporting account is flagged.
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub account_flagged: Option<bool>,
}

impl Report {
    /// Parses [`Self::created_at`] into a naive UTC timestamp.
    ///
    /// Accepts both RFC 3339 timestamps (with offset) and the naive ISO 8601
    /// form the reports API emits. Returns `None` if neither parses.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }

    /// Navigation link for the report location.
    #[must_use]
    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Parses a server timestamp, with or without a UTC offset.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Operator-selected filters over the report table.
///
/// All fields start unset, which matches every report. Set fields combine
/// conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Exact severity label to match.
    pub severity: Option<SeverityLabel>,
    /// Exact status to match.
    pub status: Option<ReportStatus>,
    /// Case-insensitive substring of the emergency type.
    pub emergency_type: Option<String>,
}

impl FilterState {
    /// Whether no field is set. An empty emergency type counts as unset.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.severity.is_none()
            && self.status.is_none()
            && self.emergency_type.as_deref().is_none_or(str::is_empty)
    }
}

/// The authenticated operator returned by `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorAccount {
    /// Account identifier.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Role name (`admin`, `responder`, ...).
    pub role: String,
    /// Account risk score.
    #[serde(default)]
    pub risk_score: f64,
    /// Whether the account itself is flagged.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub account_flagged: bool,
}

/// Accepts JSON booleans as well as the `0`/`1` integers `SQLite`-backed
/// servers emit for boolean columns.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_flag")] bool);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(b)| b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn report_json(status: &str) -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "created_at": "2025-03-02T08:15:00.123456",
            "reporter_email": "citizen@slsu.local",
            "emergency_type": "Fire",
            "description": "Smoke from the second floor",
            "latitude": 14.123,
            "longitude": 121.456,
            "severity_label": "Critical",
            "severity_confidence": 0.91,
            "verification_score": 72.5,
            "suspicious": 0,
            "status": status,
            "selfie_url": "/uploads/selfie_a.jpg",
            "accident_url": "/uploads/accident_a.jpg",
            "account_flagged": 1
        })
    }

    #[test]
    fn status_labels_match_wire_format() {
        assert_eq!(ReportStatus::NeedsReview.to_string(), "Needs Review");
        assert_eq!(
            ReportStatus::from_str("Needs Review").unwrap(),
            ReportStatus::NeedsReview
        );
        for status in ReportStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn deserializes_report_with_integer_flags() {
        let report: Report = serde_json::from_value(report_json("Needs Review")).unwrap();
        assert_eq!(report.status, ReportStatus::NeedsReview);
        assert!(!report.suspicious);
        assert_eq!(report.account_flagged, Some(true));
        assert_eq!(report.severity_label, SeverityLabel::Critical);
        assert!(report.created_at_utc().is_some());
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(serde_json::from_value::<Report>(report_json("Escalated")).is_err());
    }

    #[test]
    fn severity_is_case_sensitive() {
        assert!(SeverityLabel::from_str("critical").is_err());
        assert_eq!(
            SeverityLabel::from_str("Critical").unwrap(),
            SeverityLabel::Critical
        );
    }

    #[test]
    fn transition_targets_map_onto_statuses() {
        for target in TransitionTarget::all() {
            let status = ReportStatus::from(*target);
            assert_eq!(TransitionTarget::try_from(status).unwrap(), *target);
            assert_eq!(status.to_string(), target.to_string());
        }
        assert!(TransitionTarget::try_from(ReportStatus::Pending).is_err());
        assert!(TransitionTarget::try_from(ReportStatus::NeedsReview).is_err());
    }

    #[test]
    fn awaiting_verification_covers_both_intake_statuses() {
        let awaiting: Vec<_> = ReportStatus::all()
            .iter()
            .filter(|s| s.is_awaiting_verification())
            .collect();
        assert_eq!(
            awaiting,
            [&ReportStatus::Pending, &ReportStatus::NeedsReview]
        );
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        let naive = parse_timestamp("2025-03-02T08:15:00").unwrap();
        let offset = parse_timestamp("2025-03-02T10:15:00+02:00").unwrap();
        assert_eq!(naive, offset);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn blank_emergency_type_filter_is_unset() {
        let filter = FilterState {
            emergency_type: Some(String::new()),
            ..FilterState::default()
        };
        assert!(filter.is_unset());
        assert!(FilterState::default().is_unset());
    }
}
