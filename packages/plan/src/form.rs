//! The plan request form and its busy state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{PlanError, PlanRequest, PlanService, ResponsePlan};

/// Submit label while idle.
pub const SUBMIT_LABEL: &str = "Generate AI Response Plan";
/// Submit label while a request is in flight.
pub const BUSY_LABEL: &str = "Analyzing...";

/// Holds the form busy until dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Plan request form.
///
/// The submit affordance is disabled from submission until the request
/// settles, whether it succeeds, fails, or the future is dropped.
#[derive(Debug, Default)]
pub struct PlanForm {
    busy: AtomicBool,
}

impl PlanForm {
    /// Creates an idle form.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Label for the submit control.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.is_busy() { BUSY_LABEL } else { SUBMIT_LABEL }
    }

    /// Submits `request` to `service`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Busy`] if a request is already in flight, or
    /// whatever error the service returns.
    pub async fn submit<S: PlanService + ?Sized>(
        &self,
        service: &S,
        request: &PlanRequest,
    ) -> Result<ResponsePlan, PlanError> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            return Err(PlanError::Busy);
        };

        let result = service.request_plan(request).await;
        if let Err(e) = &result {
            log::warn!("Plan request failed: {e}");
        }
        result
    }
}
