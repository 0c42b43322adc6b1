#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the triage console.
//!
//! Provides [`init_logger`], which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while spinners redraw, a
//! [`request_spinner`] for in-flight requests, and operator credential
//! lookup with a `dialoguer` fallback.

use std::time::Duration;

use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Environment variable holding the operator email.
pub const EMAIL_ENV: &str = "TRIAGE_EMAIL";
/// Environment variable holding the operator password.
pub const PASSWORD_ENV: &str = "TRIAGE_PASSWORD";

/// Starts a spinner for a request that has no measurable progress.
///
/// Finish it with [`ProgressBar::finish_and_clear`] once the request
/// settles.
#[must_use]
pub fn request_spinner(multi: &MultiProgress, message: &str) -> ProgressBar {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar
}

/// Operator login credentials.
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Resolves credentials from `lookup`, falling back to `prompt` for any
/// missing or empty value.
///
/// # Errors
///
/// Returns whatever error `prompt` returns.
pub fn resolve_credentials<L, P>(lookup: L, mut prompt: P) -> dialoguer::Result<Credentials>
where
    L: Fn(&str) -> Option<String>,
    P: FnMut(&str) -> dialoguer::Result<String>,
{
    let mut value = |key: &str| match lookup(key).filter(|v| !v.is_empty()) {
        Some(v) => Ok(v),
        None => prompt(key),
    };
    Ok(Credentials {
        email: value(EMAIL_ENV)?,
        password: value(PASSWORD_ENV)?,
    })
}

/// Reads credentials from `TRIAGE_EMAIL` / `TRIAGE_PASSWORD`, prompting
/// interactively for whichever is unset. The password prompt hides input.
///
/// # Errors
///
/// Returns an error if an interactive prompt fails (e.g. no terminal).
pub fn credentials_from_env_or_prompt() -> dialoguer::Result<Credentials> {
    resolve_credentials(
        |key| std::env::var(key).ok(),
        |key| {
            if key == PASSWORD_ENV {
                Password::new().with_prompt("Password").interact()
            } else {
                Input::new().with_prompt("Email").interact_text()
            }
        },
    )
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
