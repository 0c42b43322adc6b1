#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report state and analytics reconciliation engine for the triage console.
//!
//! [`Console`] ties the pieces together: the [`session::SessionGate`] holds
//! the operator credential, [`store::ReportStore`] and
//! [`projection::ProjectionStore`] hold the last-good server snapshots,
//! [`filter`] and [`metrics`] derive the table and the metric cards, and
//! [`transition`] writes status changes and reloads both snapshots.
//!
//! Failures are caught per component and kept as inline messages in
//! [`ComponentErrors`]; a failing read never blanks the other component.

pub mod filter;
pub mod inspector;
pub mod metrics;
pub mod projection;
pub mod render;
pub mod session;
pub mod store;
pub mod transition;

#[cfg(test)]
mod test_support;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use triage_analytics_models::AnalyticsProjection;
use triage_api::{ApiError, BearerToken, ConsoleApi};
use triage_report_models::{FilterState, OperatorAccount, Report, TransitionTarget};

use crate::inspector::DetailInspector;
use crate::metrics::Summary;
use crate::projection::{ChartPanel, ProjectionStore};
use crate::session::{SessionGate, SessionTicket};
use crate::store::{ReportSnapshot, ReportStore};

/// A console component that fetches its own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Component {
    /// The report list.
    Reports,
    /// The analytics projection.
    Analytics,
}

/// Errors surfaced by the console.
#[derive(Debug, Clone, Error)]
pub enum ConsoleError {
    /// No session is active.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The credential was rejected; the operator must log in again.
    #[error("{message}")]
    Auth {
        /// Server-supplied message.
        message: String,
    },

    /// A read failed; the last-good snapshot is kept.
    #[error("{message}")]
    Fetch {
        /// Which component failed.
        component: Component,
        /// Server-supplied or transport message.
        message: String,
    },

    /// A status write was rejected; nothing was reloaded.
    #[error("Could not set report #{report_id} to {target}: {message}")]
    Transition {
        /// Target report.
        report_id: i64,
        /// Requested status.
        target: TransitionTarget,
        /// Server-supplied or transport message.
        message: String,
        /// Whether the rejection ended the session.
        session_ended: bool,
    },

    /// The requested report is not in the current snapshot.
    #[error("Report #{id} is not in the current list")]
    UnknownReport {
        /// Requested id.
        id: i64,
    },

    /// The PDF export failed.
    #[error("{message}")]
    Export {
        /// Server-supplied or transport message.
        message: String,
    },
}

impl ConsoleError {
    /// Classifies a failed read of `component`.
    #[must_use]
    pub fn from_read(component: Component, err: &ApiError) -> Self {
        let message = err.to_string();
        if err.is_unauthorized() {
            Self::Auth { message }
        } else {
            Self::Fetch { component, message }
        }
    }

    /// Whether the error ended the session.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Auth { .. }
                | Self::Transition {
                    session_ended: true,
                    ..
                }
        )
    }
}

/// Whether a fetched response was applied to its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The snapshot was replaced.
    Applied,
    /// The session ended while the request was in flight; the response was
    /// dropped.
    Discarded,
}

/// Per-component result of one refresh cycle.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Report list reload.
    pub reports: Result<LoadStatus, ConsoleError>,
    /// Analytics reload.
    pub analytics: Result<LoadStatus, ConsoleError>,
}

impl RefreshOutcome {
    /// Whether both components loaded without error.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.reports.is_ok() && self.analytics.is_ok()
    }

    fn auth_error(&self) -> Option<&ConsoleError> {
        [&self.reports, &self.analytics]
            .into_iter()
            .find_map(|r| r.as_ref().err().filter(|e| e.is_auth()))
    }
}

/// Inline error messages, one slot per component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentErrors {
    /// Last report list failure.
    pub reports: Option<String>,
    /// Last analytics failure.
    pub analytics: Option<String>,
    /// Last status write failure.
    pub transition: Option<String>,
}

impl ComponentErrors {
    /// Whether any component is showing an error.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.reports.is_some() || self.analytics.is_some() || self.transition.is_some()
    }

    fn record(&mut self, outcome: &RefreshOutcome) {
        self.reports = outcome.reports.as_ref().err().map(ToString::to_string);
        self.analytics = outcome.analytics.as_ref().err().map(ToString::to_string);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The operator console: session, snapshots, and derived views.
///
/// All methods take `&self`, so a console can be shared behind an [`Arc`]
/// while requests are in flight.
#[derive(Debug)]
pub struct Console<A: ConsoleApi> {
    api: A,
    session: SessionGate,
    reports: ReportStore,
    analytics: ProjectionStore,
    filter: Mutex<FilterState>,
    inspector: Mutex<DetailInspector>,
    errors: Mutex<ComponentErrors>,
}

impl<A: ConsoleApi> Console<A> {
    /// Creates a logged-out console over `api`.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: SessionGate::new(),
            reports: ReportStore::new(),
            analytics: ProjectionStore::new(),
            filter: Mutex::new(FilterState::default()),
            inspector: Mutex::new(DetailInspector::new()),
            errors: Mutex::new(ComponentErrors::default()),
        }
    }

    /// The underlying API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Logs in and starts a fresh session with empty snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Auth`] carrying the server's message if the
    /// credentials are rejected or the request fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<OperatorAccount, ConsoleError> {
        log::info!("Logging in as {email}");
        let response = self
            .api
            .login(email, password)
            .await
            .map_err(|e| ConsoleError::Auth {
                message: e.to_string(),
            })?;

        self.reset_views();
        self.session
            .establish(BearerToken::new(response.token), response.user.clone());
        Ok(response.user)
    }

    /// Ends the session and drops every snapshot.
    pub fn logout(&self) {
        self.session.logout();
        self.reset_views();
    }

    fn reset_views(&self) {
        self.reports.clear();
        self.analytics.clear();
        lock(&self.inspector).dismiss();
        *lock(&self.errors) = ComponentErrors::default();
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// The logged-in operator.
    #[must_use]
    pub fn operator(&self) -> Option<OperatorAccount> {
        self.session.operator()
    }

    /// Reloads the report list and the analytics projection concurrently.
    ///
    /// The two reads are independent: each outcome is reported for its own
    /// component and one failing does not stop the other from being
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::NotAuthenticated`] if no session is active.
    /// Per-component failures are returned inside the [`RefreshOutcome`].
    pub async fn refresh(&self) -> Result<RefreshOutcome, ConsoleError> {
        let ticket = self.session.ticket()?;
        let (reports, analytics) = futures::future::join(
            self.reports.load(&self.api, &self.session, &ticket),
            self.analytics.load(&self.api, &self.session, &ticket),
        )
        .await;

        let outcome = RefreshOutcome { reports, analytics };
        self.settle(&ticket, &outcome);
        Ok(outcome)
    }

    /// Sets a report's status, then reloads reports and analytics in full.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::NotAuthenticated`] without a session and
    /// [`ConsoleError::Transition`] if the server rejects the write. In
    /// both cases the snapshots are untouched and nothing is reloaded.
    pub async fn set_status(
        &self,
        report_id: i64,
        target: TransitionTarget,
    ) -> Result<RefreshOutcome, ConsoleError> {
        let ticket = self.session.ticket()?;
        let result = transition::set_status(
            &self.api,
            &self.session,
            &ticket,
            &self.reports,
            &self.analytics,
            report_id,
            target,
        )
        .await;

        match &result {
            Ok(outcome) => {
                if self.settle(&ticket, outcome) {
                    lock(&self.errors).transition = None;
                }
            }
            Err(e) if e.is_auth() || self.session.is_current(&ticket) => {
                lock(&self.errors).transition = Some(e.to_string());
            }
            Err(e) => log::info!("Dropping status write failure from an ended session: {e}"),
        }
        result
    }

    /// Applies the side effects of a reload issued under `ticket`.
    ///
    /// Nothing is recorded if that session has ended since. Returns whether
    /// the outcome was applied.
    fn settle(&self, ticket: &SessionTicket, outcome: &RefreshOutcome) -> bool {
        if !self.session.is_current(ticket) {
            log::debug!("Session changed during reload; leaving inline errors untouched");
            return false;
        }
        if let Some(e) = outcome.auth_error() {
            self.session.invalidate_if_current(ticket, &e.to_string());
        }
        lock(&self.errors).record(outcome);
        lock(&self.inspector).reconcile(&self.reports.snapshot());
        true
    }

    /// Downloads the server-rendered PDF summary.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::NotAuthenticated`] without a session,
    /// [`ConsoleError::Auth`] if the credential is rejected, and
    /// [`ConsoleError::Export`] for any other failure.
    pub async fn export_pdf(&self) -> Result<Vec<u8>, ConsoleError> {
        let ticket = self.session.ticket()?;
        match self.api.export_pdf(ticket.token()).await {
            Ok(bytes) => {
                log::info!("Exported PDF summary ({} bytes)", bytes.len());
                Ok(bytes)
            }
            Err(e) if e.is_unauthorized() => {
                self.session.invalidate_if_current(&ticket, &e.to_string());
                Err(ConsoleError::Auth {
                    message: e.to_string(),
                })
            }
            Err(e) => Err(ConsoleError::Export {
                message: e.to_string(),
            }),
        }
    }

    /// The current report snapshot.
    #[must_use]
    pub fn reports(&self) -> Arc<ReportSnapshot> {
        self.reports.snapshot()
    }

    /// The current analytics projection.
    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsProjection> {
        self.analytics.snapshot()
    }

    /// Dashboard panels for the current projection.
    #[must_use]
    pub fn panels(&self) -> Vec<ChartPanel> {
        projection::panels(&self.analytics())
    }

    /// Replaces the table filter.
    pub fn set_filter(&self, filter: FilterState) {
        log::debug!("Filter set to {filter:?}");
        *lock(&self.filter) = filter;
    }

    /// The current table filter.
    #[must_use]
    pub fn filter(&self) -> FilterState {
        lock(&self.filter).clone()
    }

    /// Table rows: the current snapshot narrowed by the filter.
    #[must_use]
    pub fn visible_reports(&self) -> Vec<Report> {
        let snapshot = self.reports();
        let filter = self.filter();
        filter::apply(snapshot.reports(), &filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Metric cards over the whole snapshot, ignoring the filter.
    #[must_use]
    pub fn metrics(&self) -> Summary {
        metrics::summarize(self.reports().reports())
    }

    /// Opens the detail view on report `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::UnknownReport`] if the id is not in the
    /// current snapshot.
    pub fn select(&self, id: i64) -> Result<Report, ConsoleError> {
        let snapshot = self.reports();
        let mut inspector = lock(&self.inspector);
        inspector.select(id, &snapshot)?;
        inspector
            .resolve(&snapshot)
            .cloned()
            .ok_or(ConsoleError::UnknownReport { id })
    }

    /// Closes the detail view.
    pub fn dismiss(&self) {
        lock(&self.inspector).dismiss();
    }

    /// The report in the detail view, resolved against the current
    /// snapshot.
    #[must_use]
    pub fn selected(&self) -> Option<Report> {
        lock(&self.inspector).resolve(&self.reports()).cloned()
    }

    /// Inline error messages per component.
    #[must_use]
    pub fn errors(&self) -> ComponentErrors {
        lock(&self.errors).clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use triage_analytics_models::NamedCount;
    use triage_report_models::{ReportStatus, SeverityLabel};

    use super::*;
    use crate::test_support::{FakeApi, report};

    async fn logged_in(api: FakeApi) -> Console<FakeApi> {
        let console = Console::new(api);
        console.login("admin@slsu.local", "pw").await.unwrap();
        console
    }

    fn analytics_with_fire(count: u64) -> AnalyticsProjection {
        AnalyticsProjection {
            reports_per_type: vec![NamedCount {
                name: "Fire".to_string(),
                value: count,
            }],
            ..AnalyticsProjection::default()
        }
    }

    #[tokio::test]
    async fn refresh_requires_session() {
        let console = Console::new(FakeApi::new());
        assert!(matches!(
            console.refresh().await,
            Err(ConsoleError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn failed_login_surfaces_server_message() {
        let api = FakeApi::new();
        api.push_login(Err(FakeApi::status(401, "Invalid credentials")));
        let console = Console::new(api);

        let err = console.login("x@y.z", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(!console.is_authenticated());
    }

    #[tokio::test]
    async fn transition_reloads_store_in_full() {
        let api = FakeApi::new();
        api.push_reports(Ok(vec![
            report(7, SeverityLabel::Critical, ReportStatus::Pending, "Fire"),
            report(8, SeverityLabel::Low, ReportStatus::Pending, "Flood"),
        ]));
        api.push_analytics(Ok(analytics_with_fire(1)));
        let console = logged_in(api).await;
        console.refresh().await.unwrap();

        console.api().push_set_status(Ok(()));
        console.api().push_reports(Ok(vec![
            report(7, SeverityLabel::Critical, ReportStatus::Resolved, "Fire"),
            report(9, SeverityLabel::Medium, ReportStatus::NeedsReview, "Medical"),
        ]));
        console.api().push_analytics(Ok(analytics_with_fire(2)));

        let outcome = console
            .set_status(7, TransitionTarget::Resolved)
            .await
            .unwrap();
        assert!(outcome.is_ok());

        let snapshot = console.reports();
        assert_eq!(snapshot.get(7).unwrap().status, ReportStatus::Resolved);
        assert!(!snapshot.contains(8));
        assert!(snapshot.contains(9));
        assert_eq!(console.analytics().reports_per_type[0].value, 2);
        assert_eq!(
            console.api().calls()[2..],
            ["set_status 7 Resolved", "list_reports", "analytics"]
        );
    }

    #[tokio::test]
    async fn rejected_transition_keeps_snapshots_and_skips_reload() {
        let api = FakeApi::new();
        api.push_reports(Ok(vec![report(
            7,
            SeverityLabel::Critical,
            ReportStatus::Pending,
            "Fire",
        )]));
        api.push_analytics(Ok(analytics_with_fire(1)));
        let console = logged_in(api).await;
        console.refresh().await.unwrap();
        let reports_before = console.reports();
        let analytics_before = console.analytics();

        console
            .api()
            .push_set_status(Err(FakeApi::status(404, "Report not found")));
        let err = console
            .set_status(7, TransitionTarget::Dispatched)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Transition { report_id: 7, .. }));
        assert_eq!(
            err.to_string(),
            "Could not set report #7 to Dispatched: Report not found"
        );
        assert!(Arc::ptr_eq(&reports_before, &console.reports()));
        assert!(Arc::ptr_eq(&analytics_before, &console.analytics()));
        assert_eq!(console.api().calls().last().unwrap(), "set_status 7 Dispatched");
        assert_eq!(
            console.errors().transition.as_deref(),
            Some("Could not set report #7 to Dispatched: Report not found")
        );
        assert!(console.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_write_ends_session() {
        let console = logged_in(FakeApi::new()).await;
        console
            .api()
            .push_set_status(Err(FakeApi::status(401, "Token expired")));

        let err = console
            .set_status(3, TransitionTarget::Verified)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Transition { .. }));
        assert!(!console.is_authenticated());
    }

    #[tokio::test]
    async fn one_failing_component_does_not_block_the_other() {
        let api = FakeApi::new();
        api.push_reports(Err(FakeApi::status(500, "Database locked")));
        api.push_analytics(Ok(analytics_with_fire(4)));
        let console = logged_in(api).await;

        let outcome = console.refresh().await.unwrap();
        assert!(outcome.reports.is_err());
        assert_eq!(outcome.analytics.unwrap(), LoadStatus::Applied);
        assert_eq!(console.analytics().reports_per_type[0].value, 4);

        let errors = console.errors();
        assert_eq!(errors.reports.as_deref(), Some("Database locked"));
        assert!(errors.analytics.is_none());
        assert!(console.is_authenticated());
    }

    #[tokio::test]
    async fn successful_refresh_clears_component_error() {
        let api = FakeApi::new();
        api.push_analytics(Err(FakeApi::status(503, "Service unavailable")));
        let console = logged_in(api).await;

        console.refresh().await.unwrap();
        assert!(console.errors().analytics.is_some());

        console.refresh().await.unwrap();
        assert!(!console.errors().any());
    }

    #[tokio::test]
    async fn unauthorized_read_invalidates_session() {
        let api = FakeApi::new();
        api.push_reports(Err(FakeApi::status(401, "Token expired")));
        let console = logged_in(api).await;

        let outcome = console.refresh().await.unwrap();
        assert!(outcome.reports.unwrap_err().is_auth());
        assert!(!console.is_authenticated());
        assert!(matches!(
            console.refresh().await,
            Err(ConsoleError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn logout_during_refresh_discards_response() {
        let api = FakeApi::new();
        let gate = api.hold_reports();
        api.push_reports(Ok(vec![report(
            1,
            SeverityLabel::Low,
            ReportStatus::Pending,
            "Flood",
        )]));
        let console = Arc::new(logged_in(api).await);

        let task = tokio::spawn({
            let console = Arc::clone(&console);
            async move { console.refresh().await }
        });
        gate.entered.notified().await;
        console.logout();
        gate.release.notify_one();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome.reports.unwrap(), LoadStatus::Discarded);
        assert!(console.reports().is_empty());
        assert!(!console.is_authenticated());
    }

    #[tokio::test]
    async fn late_unauthorized_read_keeps_newer_session() {
        let api = FakeApi::new();
        let gate = api.hold_reports();
        api.push_reports(Err(FakeApi::status(401, "Token expired")));
        let console = Arc::new(logged_in(api).await);

        let task = tokio::spawn({
            let console = Arc::clone(&console);
            async move { console.refresh().await }
        });
        gate.entered.notified().await;
        console.logout();
        console.login("dispatcher@slsu.local", "pw").await.unwrap();
        gate.release.notify_one();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome.reports.unwrap(), LoadStatus::Discarded);
        assert!(console.is_authenticated());
        assert_eq!(console.operator().unwrap().email, "dispatcher@slsu.local");
        assert_eq!(console.errors(), ComponentErrors::default());
    }

    #[tokio::test]
    async fn failure_after_logout_is_not_shown() {
        let api = FakeApi::new();
        let gate = api.hold_reports();
        api.push_reports(Err(FakeApi::status(500, "Database locked")));
        let console = Arc::new(logged_in(api).await);

        let task = tokio::spawn({
            let console = Arc::clone(&console);
            async move { console.refresh().await }
        });
        gate.entered.notified().await;
        console.logout();
        gate.release.notify_one();

        task.await.unwrap().unwrap();
        assert!(!console.errors().any());
    }

    #[tokio::test]
    async fn filter_narrows_table_but_not_metrics() {
        let api = FakeApi::new();
        api.push_reports(Ok(vec![
            report(1, SeverityLabel::Critical, ReportStatus::Pending, "Fire"),
            report(2, SeverityLabel::Low, ReportStatus::Resolved, "Flood"),
        ]));
        let console = logged_in(api).await;
        console.refresh().await.unwrap();

        console.set_filter(FilterState {
            emergency_type: Some("flo".to_string()),
            ..FilterState::default()
        });

        let rows: Vec<i64> = console.visible_reports().iter().map(|r| r.id).collect();
        assert_eq!(rows, [2]);
        assert_eq!(console.metrics().total, 2);
        assert_eq!(console.metrics().critical, 1);
    }

    #[tokio::test]
    async fn detail_view_follows_reload() {
        let api = FakeApi::new();
        api.push_reports(Ok(vec![
            report(7, SeverityLabel::Critical, ReportStatus::Pending, "Fire"),
            report(8, SeverityLabel::Low, ReportStatus::Pending, "Flood"),
        ]));
        let console = logged_in(api).await;
        console.refresh().await.unwrap();
        console.select(7).unwrap();
        console.api().push_reports(Ok(vec![report(
            7,
            SeverityLabel::Critical,
            ReportStatus::Verified,
            "Fire",
        )]));

        console.refresh().await.unwrap();
        assert_eq!(console.selected().unwrap().status, ReportStatus::Verified);

        console
            .api()
            .push_reports(Ok(vec![report(8, SeverityLabel::Low, ReportStatus::Pending, "Flood")]));
        console.refresh().await.unwrap();
        assert!(console.selected().is_none());
    }

    #[tokio::test]
    async fn logout_clears_snapshots() {
        let api = FakeApi::new();
        api.push_reports(Ok(vec![report(
            1,
            SeverityLabel::Low,
            ReportStatus::Pending,
            "Flood",
        )]));
        api.push_analytics(Ok(analytics_with_fire(1)));
        let console = logged_in(api).await;
        console.refresh().await.unwrap();

        console.logout();
        assert!(console.reports().is_empty());
        assert!(console.analytics().is_empty());
        assert!(console.operator().is_none());
    }

    #[tokio::test]
    async fn export_failure_is_reported_without_ending_session() {
        let api = FakeApi::new();
        api.push_export(Err(FakeApi::status(500, "Export failed")));
        let console = logged_in(api).await;

        let err = console.export_pdf().await.unwrap_err();
        assert!(matches!(err, ConsoleError::Export { .. }));
        assert!(console.is_authenticated());
    }
}
