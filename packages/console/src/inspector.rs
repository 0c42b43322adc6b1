//! Detail inspector: one selected report and its actions.
//!
//! The inspector remembers the selected report's id, not the record.
//! After every reload it re-resolves the id against the new snapshot, so it
//! always shows current data, and closes itself when the report is gone.

use triage_report_models::{Report, TransitionTarget};

use crate::ConsoleError;
use crate::store::ReportSnapshot;

/// Selection state of the detail view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailInspector {
    selected: Option<i64>,
}

impl DetailInspector {
    /// Creates a closed inspector.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Opens the inspector on report `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::UnknownReport`] if `snapshot` has no report
    /// with that id.
    pub fn select(&mut self, id: i64, snapshot: &ReportSnapshot) -> Result<(), ConsoleError> {
        if !snapshot.contains(id) {
            return Err(ConsoleError::UnknownReport { id });
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Closes the inspector.
    pub const fn dismiss(&mut self) {
        self.selected = None;
    }

    /// The selected report id, if open.
    #[must_use]
    pub const fn selected_id(&self) -> Option<i64> {
        self.selected
    }

    /// Resolves the selection against `snapshot`.
    #[must_use]
    pub fn resolve<'a>(&self, snapshot: &'a ReportSnapshot) -> Option<&'a Report> {
        self.selected.and_then(|id| snapshot.get(id))
    }

    /// Re-resolves after a reload. Closes the inspector and returns `true`
    /// if the selected report no longer exists.
    pub fn reconcile(&mut self, snapshot: &ReportSnapshot) -> bool {
        match self.selected {
            Some(id) if !snapshot.contains(id) => {
                log::info!("Report #{id} is gone after reload; closing detail view");
                self.selected = None;
                true
            }
            _ => false,
        }
    }

    /// The status actions offered for any selected report.
    #[must_use]
    pub const fn actions() -> &'static [TransitionTarget] {
        TransitionTarget::all()
    }
}
