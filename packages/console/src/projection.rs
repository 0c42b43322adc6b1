//! Analytics projection consumer.
//!
//! The projection is fetched separately from the report list and rendered
//! as-is. It is never reconciled against the report store. Each series
//! becomes one [`ChartPanel`]; an empty series becomes an explicit empty
//! panel rather than an error.

use std::sync::Arc;

use triage_analytics_models::{AnalyticsProjection, FlaggedUser, severity_color};
use triage_api::ConsoleApi;

use crate::session::{SessionGate, SessionTicket};
use crate::store::SnapshotCell;
use crate::{Component, ConsoleError, LoadStatus};

/// Bar color for the per-type chart.
pub const TYPE_BAR_COLOR: &str = "#2d8cff";
/// Line color for the over-time chart.
pub const TIMELINE_COLOR: &str = "#f14b5d";
/// Bar color for the per-status chart.
pub const STATUS_BAR_COLOR: &str = "#6c5ce7";

/// Holds the last fetched projection.
#[derive(Debug, Default)]
pub struct ProjectionStore {
    cell: SnapshotCell<AnalyticsProjection>,
}

impl ProjectionStore {
    /// Creates a store holding an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current projection.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AnalyticsProjection> {
        self.cell.get()
    }

    /// Resets to an empty projection.
    pub fn clear(&self) {
        self.cell.replace(AnalyticsProjection::default());
    }

    /// Fetches the projection and replaces the held one wholesale.
    ///
    /// Any response, failed or not, is discarded if the session `ticket`
    /// was issued under has ended in the meantime.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Auth`] or [`ConsoleError::Fetch`]; the
    /// previous projection is kept.
    pub async fn load<A: ConsoleApi + ?Sized>(
        &self,
        api: &A,
        session: &SessionGate,
        ticket: &SessionTicket,
    ) -> Result<LoadStatus, ConsoleError> {
        log::debug!("Fetching analytics...");
        let result = api.analytics(ticket.token()).await;

        if !session.is_current(ticket) {
            log::info!("Discarding analytics response from an ended session");
            return Ok(LoadStatus::Discarded);
        }

        let projection = result.map_err(|e| ConsoleError::from_read(Component::Analytics, &e))?;

        self.cell.replace(projection);
        Ok(LoadStatus::Applied)
    }
}

/// One labelled, colored value in a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    /// Category or day label.
    pub label: String,
    /// Count.
    pub value: u64,
    /// Fill color.
    pub color: &'static str,
}

/// What a panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    /// The series had no entries.
    Empty {
        /// Message shown in place of the chart.
        message: &'static str,
    },
    /// A bar, pie, or line series.
    Series(Vec<ChartBar>),
    /// The flagged-user list.
    Users(Vec<FlaggedUser>),
}

/// A titled dashboard panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    /// Panel heading.
    pub title: &'static str,
    /// Panel content.
    pub body: PanelBody,
}

impl ChartPanel {
    /// Whether the panel renders its empty state.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.body, PanelBody::Empty { .. })
    }
}

const NO_DATA: &str = "No data available.";

fn series_panel(title: &'static str, bars: Vec<ChartBar>) -> ChartPanel {
    let body = if bars.is_empty() {
        PanelBody::Empty { message: NO_DATA }
    } else {
        PanelBody::Series(bars)
    };
    ChartPanel { title, body }
}

/// Builds the dashboard panels for `projection`.
///
/// Always returns the four primary panels (per type, severity, over time,
/// flagged users) in that order. A status panel follows only when the
/// server sent a non-empty status series.
#[must_use]
pub fn panels(projection: &AnalyticsProjection) -> Vec<ChartPanel> {
    let mut panels = vec![
        series_panel(
            "Reports per Emergency Type",
            projection
                .reports_per_type
                .iter()
                .map(|c| ChartBar {
                    label: c.name.clone(),
                    value: c.value,
                    color: TYPE_BAR_COLOR,
                })
                .collect(),
        ),
        series_panel(
            "Severity Distribution",
            projection
                .severity_distribution
                .iter()
                .map(|c| ChartBar {
                    label: c.name.clone(),
                    value: c.value,
                    color: severity_color(&c.name),
                })
                .collect(),
        ),
        series_panel(
            "Reports Over Time",
            projection
                .reports_over_time
                .iter()
                .map(|d| ChartBar {
                    label: d.day.clone(),
                    value: d.value,
                    color: TIMELINE_COLOR,
                })
                .collect(),
        ),
        ChartPanel {
            title: "Flagged Users",
            body: if projection.flagged_users.is_empty() {
                PanelBody::Empty {
                    message: "No flagged users.",
                }
            } else {
                PanelBody::Users(projection.flagged_users.clone())
            },
        },
    ];

    if !projection.status_distribution.is_empty() {
        panels.push(series_panel(
            "Status Distribution",
            projection
                .status_distribution
                .iter()
                .map(|c| ChartBar {
                    label: c.name.clone(),
                    value: c.value,
                    color: STATUS_BAR_COLOR,
                })
                .collect(),
        ));
    }

    panels
}
