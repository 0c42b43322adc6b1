//! In-memory [`ConsoleApi`] fake and report fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use triage_analytics_models::AnalyticsProjection;
use triage_api::{ApiError, BearerToken, ConsoleApi, GENERIC_API_ERROR, LoginResponse};
use triage_report_models::{OperatorAccount, Report, ReportStatus, SeverityLabel, TransitionTarget};

use crate::lock;
use crate::session::{SessionGate, SessionTicket};

type Queue<T> = Mutex<VecDeque<Result<T, ApiError>>>;

/// Lets a test pause `list_reports` mid-flight.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    /// Notified once the request has started.
    pub entered: Arc<Notify>,
    /// Notify to let the request complete.
    pub release: Arc<Notify>,
}

/// Scripted API. Each call pops the next queued result; an empty queue
/// answers with an empty success.
#[derive(Debug, Default)]
pub struct FakeApi {
    logins: Queue<LoginResponse>,
    reports: Queue<Vec<Report>>,
    analytics: Queue<AnalyticsProjection>,
    writes: Queue<()>,
    exports: Queue<Vec<u8>>,
    calls: Mutex<Vec<String>>,
    reports_gate: Mutex<Option<RequestGate>>,
}

fn pop<T>(queue: &Queue<T>) -> Option<Result<T, ApiError>> {
    lock(queue).pop_front()
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// An error as the HTTP client would build it from a `{"detail": ..}`
    /// body.
    pub fn status(status: u16, detail: &str) -> ApiError {
        let body = serde_json::json!({ "detail": detail }).to_string();
        ApiError::from_status(status, &body, GENERIC_API_ERROR)
    }

    pub fn push_login(&self, result: Result<LoginResponse, ApiError>) {
        lock(&self.logins).push_back(result);
    }

    pub fn push_reports(&self, result: Result<Vec<Report>, ApiError>) {
        lock(&self.reports).push_back(result);
    }

    pub fn push_analytics(&self, result: Result<AnalyticsProjection, ApiError>) {
        lock(&self.analytics).push_back(result);
    }

    pub fn push_set_status(&self, result: Result<(), ApiError>) {
        lock(&self.writes).push_back(result);
    }

    pub fn push_export(&self, result: Result<Vec<u8>, ApiError>) {
        lock(&self.exports).push_back(result);
    }

    /// Holds the next `list_reports` call until the gate is released.
    pub fn hold_reports(&self) -> RequestGate {
        let gate = RequestGate::default();
        *lock(&self.reports_gate) = Some(gate.clone());
        gate
    }

    /// Authenticated calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl ConsoleApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
        pop(&self.logins).unwrap_or_else(|| {
            Ok(LoginResponse {
                token: "tok".to_string(),
                user: OperatorAccount {
                    email: email.to_string(),
                    ..operator()
                },
            })
        })
    }

    async fn list_reports(&self, _token: &BearerToken) -> Result<Vec<Report>, ApiError> {
        self.record("list_reports".to_string());
        let gate = lock(&self.reports_gate).take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        pop(&self.reports).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn analytics(&self, _token: &BearerToken) -> Result<AnalyticsProjection, ApiError> {
        self.record("analytics".to_string());
        pop(&self.analytics).unwrap_or_else(|| Ok(AnalyticsProjection::default()))
    }

    async fn set_status(
        &self,
        _token: &BearerToken,
        report_id: i64,
        target: TransitionTarget,
    ) -> Result<(), ApiError> {
        self.record(format!("set_status {report_id} {target}"));
        pop(&self.writes).unwrap_or(Ok(()))
    }

    async fn export_pdf(&self, _token: &BearerToken) -> Result<Vec<u8>, ApiError> {
        self.record("export_pdf".to_string());
        pop(&self.exports).unwrap_or_else(|| Ok(b"%PDF-1.4".to_vec()))
    }

    async fn health(&self) -> Result<bool, ApiError> {
        Ok(true)
    }
}

pub fn operator() -> OperatorAccount {
    OperatorAccount {
        id: 1,
        email: "admin@slsu.local".to_string(),
        role: "admin".to_string(),
        risk_score: 0.0,
        account_flagged: false,
    }
}

/// A report with plausible defaults for everything but the filterable
/// fields.
pub fn report(
    id: i64,
    severity_label: SeverityLabel,
    status: ReportStatus,
    emergency_type: &str,
) -> Report {
    Report {
        id,
        created_at: format!("2025-03-01T08:{:02}:00", id % 60),
        updated_at: None,
        reporter_email: format!("citizen{id}@example.com"),
        emergency_type: emergency_type.to_string(),
        description: format!("{emergency_type} reported near the market"),
        latitude: 9.9,
        longitude: 124.1,
        severity_label,
        severity_confidence: 0.82,
        verification_score: 0.64,
        suspicious: false,
        status,
        selfie_url: format!("/uploads/selfie_{id}.jpg"),
        accident_url: format!("/uploads/accident_{id}.jpg"),
        device_id: None,
        risk_score: None,
        account_flagged: None,
    }
}

/// A gate with an active session and a ticket for it.
pub fn session_with_token(token: &str) -> (SessionGate, SessionTicket) {
    let session = SessionGate::new();
    session.establish(BearerToken::new(token.to_string()), operator());
    let ticket = session.ticket().unwrap();
    (session, ticket)
}
