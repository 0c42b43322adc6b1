//! Report store: the in-memory collection of reports fetched from the API.
//!
//! The store holds a single [`Arc`] to an immutable [`ReportSnapshot`].
//! Refreshing builds a complete new snapshot and swaps the reference, so a
//! reader either sees the old collection or the new one, never a mix.
//! Status transitions never patch the snapshot; they trigger a reload.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use triage_api::ConsoleApi;
use triage_report_models::Report;

use crate::session::{SessionGate, SessionTicket};
use crate::{Component, ConsoleError, LoadStatus};

/// A shared, atomically replaceable snapshot.
#[derive(Debug, Default)]
pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
}

impl<T> SnapshotCell<T> {
    /// Creates a cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&self, value: T) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(value);
    }
}

/// An immutable, id-indexed collection of reports in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSnapshot {
    reports: Vec<Report>,
    index: HashMap<i64, usize>,
}

impl ReportSnapshot {
    /// Builds a snapshot, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Fetch`] if two reports share an id.
    pub fn from_reports(reports: Vec<Report>) -> Result<Self, ConsoleError> {
        let mut index = HashMap::with_capacity(reports.len());
        for (pos, report) in reports.iter().enumerate() {
            if index.insert(report.id, pos).is_some() {
                return Err(ConsoleError::Fetch {
                    component: Component::Reports,
                    message: format!("Duplicate report id {} in server response", report.id),
                });
            }
        }
        Ok(Self { reports, index })
    }

    /// All reports, in server order.
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Looks up a report by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Report> {
        self.index.get(&id).map(|&pos| &self.reports[pos])
    }

    /// Whether a report with `id` is present.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the snapshot holds no reports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// The report store.
#[derive(Debug, Default)]
pub struct ReportStore {
    cell: SnapshotCell<ReportSnapshot>,
}

impl ReportStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ReportSnapshot> {
        self.cell.get()
    }

    /// Drops all reports (session start/end).
    pub fn clear(&self) {
        self.cell.replace(ReportSnapshot::default());
    }

    /// Fetches the full report list and replaces the held snapshot.
    ///
    /// The response is discarded, leaving the store untouched, if the
    /// session `ticket` was issued under has ended in the meantime. This
    /// holds for failed responses too.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Auth`] if the server rejects the credential
    /// and [`ConsoleError::Fetch`] for any other failure, including a
    /// response with duplicate ids. The previous snapshot is kept.
    pub async fn load<A: ConsoleApi + ?Sized>(
        &self,
        api: &A,
        session: &SessionGate,
        ticket: &SessionTicket,
    ) -> Result<LoadStatus, ConsoleError> {
        log::debug!("Fetching reports...");
        let result = api.list_reports(ticket.token()).await;

        if !session.is_current(ticket) {
            match &result {
                Ok(reports) => log::info!(
                    "Discarding {} reports fetched under an ended session",
                    reports.len()
                ),
                Err(e) => log::info!("Discarding report fetch error from an ended session: {e}"),
            }
            return Ok(LoadStatus::Discarded);
        }

        let reports = result.map_err(|e| ConsoleError::from_read(Component::Reports, &e))?;

        let snapshot = ReportSnapshot::from_reports(reports)?;
        let count = snapshot.len();
        self.cell.replace(snapshot);
        log::info!("Loaded {count} reports");

        Ok(LoadStatus::Applied)
    }
}
