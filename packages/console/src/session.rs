//! Session gate: the operator credential and its lifecycle.
//!
//! A session is created by a successful login, read by every outbound
//! call, and cleared on logout or when the server reports the credential
//! invalid. It lives only in memory.
//!
//! Every change of session bumps an epoch counter. Callers take a
//! [`SessionTicket`] before issuing a request and check
//! [`SessionGate::is_current`] before applying the response, so a
//! response that arrives after logout is discarded.

use std::sync::{Mutex, MutexGuard, PoisonError};

use triage_api::BearerToken;
use triage_report_models::OperatorAccount;

use crate::ConsoleError;

/// Proof of the session a request was issued under.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    token: BearerToken,
    epoch: u64,
}

impl SessionTicket {
    /// The bearer token to send.
    #[must_use]
    pub const fn token(&self) -> &BearerToken {
        &self.token
    }
}

#[derive(Debug, Default)]
struct SessionState {
    active: Option<(BearerToken, OperatorAccount)>,
    epoch: u64,
}

/// Holds the current operator credential.
#[derive(Debug, Default)]
pub struct SessionGate {
    state: Mutex<SessionState>,
}

impl SessionGate {
    /// Creates an unauthenticated gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new session, replacing any previous one.
    pub fn establish(&self, token: BearerToken, operator: OperatorAccount) {
        let mut state = self.lock();
        state.epoch += 1;
        log::info!("Session established for {} ({})", operator.email, operator.role);
        state.active = Some((token, operator));
    }

    /// Ends the session at the operator's request.
    pub fn logout(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        if let Some((_, operator)) = state.active.take() {
            log::info!("Session closed for {}", operator.email);
        }
    }

    /// Ends the session `ticket` was issued under because the server
    /// rejected its credential.
    ///
    /// A rejection that arrives after that session already ended is
    /// ignored, so it can never end a newer one. Returns whether the
    /// session was ended.
    pub fn invalidate_if_current(&self, ticket: &SessionTicket, reason: &str) -> bool {
        let mut state = self.lock();
        if state.active.is_none() || state.epoch != ticket.epoch {
            log::debug!("Ignoring rejection from an ended session: {reason}");
            return false;
        }
        state.epoch += 1;
        state.active = None;
        log::warn!("Session invalidated: {reason}");
        true
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().active.is_some()
    }

    /// The logged-in operator, if any.
    #[must_use]
    pub fn operator(&self) -> Option<OperatorAccount> {
        self.lock()
            .active
            .as_ref()
            .map(|(_, operator)| operator.clone())
    }

    /// Takes a ticket for the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::NotAuthenticated`] if no session is active.
    pub fn ticket(&self) -> Result<SessionTicket, ConsoleError> {
        let state = self.lock();
        state
            .active
            .as_ref()
            .map(|(token, _)| SessionTicket {
                token: token.clone(),
                epoch: state.epoch,
            })
            .ok_or(ConsoleError::NotAuthenticated)
    }

    /// Whether `ticket` still belongs to the active session.
    #[must_use]
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        let state = self.lock();
        state.active.is_some() && state.epoch == ticket.epoch
    }
}
