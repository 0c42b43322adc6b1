//! Status transition controller.
//!
//! Any report may be moved to any [`TransitionTarget`] from any current
//! status. A transition is a strict three-step chain: write the status,
//! then reload the report list, then reload analytics. The held record is
//! never patched locally. If the write fails the chain stops there.

use triage_api::ConsoleApi;
use triage_report_models::TransitionTarget;

use crate::projection::ProjectionStore;
use crate::session::{SessionGate, SessionTicket};
use crate::store::ReportStore;
use crate::{ConsoleError, RefreshOutcome};

/// Writes `target` for `report_id` and reloads both snapshots.
///
/// `ticket` is the session the write is issued under. A write rejected as
/// unauthorized ends that session, unless it has already ended.
///
/// # Errors
///
/// Returns [`ConsoleError::Transition`] if the write fails. Reload failures
/// after a successful write are returned per component in the
/// [`RefreshOutcome`].
pub async fn set_status<A: ConsoleApi + ?Sized>(
    api: &A,
    session: &SessionGate,
    ticket: &SessionTicket,
    reports: &ReportStore,
    analytics: &ProjectionStore,
    report_id: i64,
    target: TransitionTarget,
) -> Result<RefreshOutcome, ConsoleError> {
    log::info!("Setting report #{report_id} to {target}");

    if let Err(e) = api.set_status(ticket.token(), report_id, target).await {
        log::warn!("Status write for report #{report_id} rejected: {e}");
        let session_ended =
            e.is_unauthorized() && session.invalidate_if_current(ticket, &e.to_string());
        return Err(ConsoleError::Transition {
            report_id,
            target,
            message: e.to_string(),
            session_ended,
        });
    }

    let reports = reports.load(api, session, ticket).await;
    let analytics = analytics.load(api, session, ticket).await;

    Ok(RefreshOutcome { reports, analytics })
}
