#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the response planner service.
//!
//! An operator describes an incident in free text with a location; the
//! planner answers with a triage assessment, nearby risk context, ranked
//! unit recommendations, and a list of actions. The service sits behind
//! the [`PlanService`] trait; [`client::HttpPlanService`] calls it over
//! HTTP and [`form::PlanForm`] guards the submit affordance while a request
//! is in flight.

pub mod client;
pub mod form;
pub mod render;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Message used when a failed response carries no `error` string.
pub const PLAN_FALLBACK_ERROR: &str = "Could not process request";

/// Errors from the planner.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The planner answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-supplied `error` string or [`PLAN_FALLBACK_ERROR`].
        message: String,
    },

    /// A success body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request from this form is already in flight.
    #[error("A plan request is already in progress")]
    Busy,
}

/// Body of `POST /api/plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// Free-text incident description.
    pub incident_text: String,
    /// Incident latitude.
    pub latitude: f64,
    /// Incident longitude.
    pub longitude: f64,
}

/// Triage assessment of the incident text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triage {
    /// Classified incident type (e.g. `fire`, `medical`).
    pub incident_type: String,
    /// Severity on a 0-10 scale.
    pub severity_score: u8,
    /// Phrases in the text that raised the severity.
    #[serde(default)]
    pub urgent_signals: Vec<String>,
}

/// One candidate response unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecommendation {
    /// Unit call sign.
    pub unit_id: String,
    /// Match score for this incident.
    pub suitability: f64,
    /// Estimated time to arrive.
    pub eta_minutes: f64,
    /// Straight-line distance to the incident.
    pub distance_km: f64,
}

/// The planner's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePlan {
    /// Triage assessment.
    pub triage: Triage,
    /// Risk zones the incident falls in.
    #[serde(default)]
    pub risk_context: Vec<String>,
    /// Units, best first.
    #[serde(default)]
    pub recommendations: Vec<UnitRecommendation>,
    /// Suggested dispatcher actions, in order.
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Severity band used to tag the triage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum SeverityBand {
    /// Score below 5.
    Low,
    /// Score 5 to 7.
    Medium,
    /// Score 8 or above.
    High,
}

impl SeverityBand {
    /// Bands a 0-10 severity score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= 8 {
            Self::High
        } else if score >= 5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Requests response plans.
#[async_trait::async_trait]
pub trait PlanService: Send + Sync {
    /// Asks the planner for a plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] if the request fails or the planner rejects
    /// the input.
    async fn request_plan(&self, request: &PlanRequest) -> Result<ResponsePlan, PlanError>;
}
