#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP client for the emergency reports API.
//!
//! The console engine talks to the backend exclusively through the
//! [`ConsoleApi`] trait. [`client::HttpConsoleApi`] implements it with
//! `reqwest`; tests substitute in-memory fakes.
//!
//! Every non-success response is turned into an [`ApiError`] carrying the
//! server's `detail` or `error` string verbatim when the body has one, and
//! a generic fallback message otherwise.

pub mod client;
pub mod config;

use serde::Deserialize;
use thiserror::Error;
use triage_analytics_models::AnalyticsProjection;
use triage_report_models::{OperatorAccount, Report, TransitionTarget};

/// Generic message used when an error response carries no detail.
pub const GENERIC_API_ERROR: &str = "API error";

/// Errors from the reports API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout,
    /// DNS failure, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the credential (HTTP 401).
    #[error("{message}")]
    Unauthorized {
        /// Server-supplied detail or a generic fallback.
        message: String,
    },

    /// The server answered with any other non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-supplied detail or a generic fallback.
        message: String,
    },

    /// A success response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the server reported the credential as invalid or expired.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Builds the error for a non-success status and its response body.
    #[must_use]
    pub fn from_status(status: u16, body: &str, fallback: &str) -> Self {
        let message = error_detail(body).unwrap_or_else(|| fallback.to_string());
        if status == 401 {
            Self::Unauthorized { message }
        } else {
            Self::Status { status, message }
        }
    }
}

/// Extracts the human-readable `detail` or `error` string from an error
/// response body.
///
/// Returns `None` if the body is not JSON or neither field is a string.
#[must_use]
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(String::from)
}

/// An opaque bearer token issued by `POST /auth/login`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Issued bearer token.
    pub token: String,
    /// The authenticated account.
    pub user: OperatorAccount,
}

/// The reports API as seen by the console.
#[async_trait::async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Exchanges operator credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the credentials are
    /// rejected.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Fetches every report, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for an invalid or expired token
    /// and other [`ApiError`] variants for any other failure.
    async fn list_reports(&self, token: &BearerToken) -> Result<Vec<Report>, ApiError>;

    /// Fetches the server-computed analytics projection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    async fn analytics(&self, token: &BearerToken) -> Result<AnalyticsProjection, ApiError>;

    /// Assigns a new status to one report.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the server rejects the write.
    async fn set_status(
        &self,
        token: &BearerToken,
        report_id: i64,
        target: TransitionTarget,
    ) -> Result<(), ApiError>;

    /// Downloads the server-rendered PDF summary.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    async fn export_pdf(&self, token: &BearerToken) -> Result<Vec<u8>, ApiError>;

    /// Checks that the API is reachable and healthy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    async fn health(&self) -> Result<bool, ApiError>;
}
