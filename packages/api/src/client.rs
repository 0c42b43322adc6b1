//! `reqwest` implementation of [`ConsoleApi`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use triage_analytics_models::AnalyticsProjection;
use triage_report_models::{Report, TransitionTarget};

use crate::config::ConsoleConfig;
use crate::{ApiError, BearerToken, ConsoleApi, GENERIC_API_ERROR, LoginResponse};

/// Reports API client over HTTP.
pub struct HttpConsoleApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpConsoleApi {
    /// Creates a client for the API at `config.api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying HTTP client cannot be
    /// built (e.g. TLS backend initialization fails).
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn authorized(builder: reqwest::RequestBuilder, token: &BearerToken) -> reqwest::RequestBuilder {
    builder.bearer_auth(token.as_str())
}

/// Sends a request and decodes a JSON success body.
async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    fallback: &str,
) -> Result<T, ApiError> {
    let resp = request.send().await?;
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), &body, fallback));
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait::async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        log::debug!("POST /auth/login for {email}");
        let request = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", password)]);
        send_json(request, "Login failed").await
    }

    async fn list_reports(&self, token: &BearerToken) -> Result<Vec<Report>, ApiError> {
        let request = authorized(self.client.get(self.url("/reports")), token);
        send_json(request, GENERIC_API_ERROR).await
    }

    async fn analytics(&self, token: &BearerToken) -> Result<AnalyticsProjection, ApiError> {
        let request = authorized(self.client.get(self.url("/reports/analytics")), token);
        send_json(request, GENERIC_API_ERROR).await
    }

    async fn set_status(
        &self,
        token: &BearerToken,
        report_id: i64,
        target: TransitionTarget,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/reports/{report_id}/status"));
        let request = authorized(self.client.patch(url), token)
            .form(&[("status_label", target.as_ref())]);
        log::debug!("PATCH /reports/{report_id}/status -> {target}");

        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(
            status.as_u16(),
            &body,
            "Status update failed",
        ))
    }

    async fn export_pdf(&self, token: &BearerToken) -> Result<Vec<u8>, ApiError> {
        let resp = authorized(self.client.get(self.url("/reports/export/pdf")), token)
            .send()
            .await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_status(
                status.as_u16(),
                &body,
                "Export failed",
            ));
        }

        Ok(resp.bytes().await?.to_vec())
    }

    async fn health(&self) -> Result<bool, ApiError> {
        #[derive(serde::Deserialize)]
        struct Health {
            status: String,
        }

        let health: Health =
            send_json(self.client.get(self.url("/health")), GENERIC_API_ERROR).await?;
        Ok(health.status == "ok")
    }
}
