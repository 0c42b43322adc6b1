//! HTTP implementation of [`PlanService`].

use std::time::Duration;

use triage_api::config::ConsoleConfig;

use crate::{PLAN_FALLBACK_ERROR, PlanError, PlanRequest, PlanService, ResponsePlan};

/// Planner client over HTTP.
pub struct HttpPlanService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPlanService {
    /// Creates a client for the planner at `config.plan_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ConsoleConfig) -> Result<Self, PlanError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.plan_base_url.clone(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/plan", self.base_url)
    }
}

/// Turns a planner response into a plan or an error.
///
/// # Errors
///
/// Returns [`PlanError::Rejected`] for a non-success status (carrying the
/// body's `error` string when present) and [`PlanError::Json`] if a
/// success body does not decode.
pub fn parse_response(status: u16, body: &str) -> Result<ResponsePlan, PlanError> {
    if !(200..300).contains(&status) {
        let message = triage_api::error_detail(body)
            .unwrap_or_else(|| PLAN_FALLBACK_ERROR.to_string());
        return Err(PlanError::Rejected { status, message });
    }
    Ok(serde_json::from_str(body)?)
}

#[async_trait::async_trait]
impl PlanService for HttpPlanService {
    async fn request_plan(&self, request: &PlanRequest) -> Result<ResponsePlan, PlanError> {
        log::info!(
            "Requesting response plan at ({}, {})",
            request.latitude,
            request.longitude
        );

        let resp = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        parse_response(status.as_u16(), &body)
    }
}
