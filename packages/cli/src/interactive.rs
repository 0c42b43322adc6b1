//! Menu-driven console session.
//!
//! Logs in, loads the dashboard, then loops over a `dialoguer` menu until
//! the operator logs out. If the server rejects the credential mid-session
//! the operator is asked to log in again.

use std::future::Future;
use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use triage_plan::PlanRequest;
use triage_report_models::{FilterState, ReportStatus, SeverityLabel, TransitionTarget};

use crate::app::{App, DEFAULT_EXPORT_FILE};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Top-level actions in the interactive console.
enum Action {
    Refresh,
    Filter,
    Show,
    SetStatus,
    Export,
    Plan,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Refresh,
        Self::Filter,
        Self::Show,
        Self::SetStatus,
        Self::Export,
        Self::Plan,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Refresh => "Refresh dashboard",
            Self::Filter => "Filter reports",
            Self::Show => "Inspect a report",
            Self::SetStatus => "Set report status",
            Self::Export => "Export as PDF",
            Self::Plan => "Generate AI response plan",
            Self::Quit => "Log out and quit",
        }
    }
}

/// Runs the interactive console.
///
/// # Errors
///
/// Returns an error if a prompt fails. Failed logins and request failures
/// are printed and the console carries on.
pub async fn run(app: &App) -> CliResult {
    println!("Emergency Triage Console");
    println!();

    if !log_in(app).await? {
        return Ok(());
    }
    app.print_dashboard();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        if !app.console().is_authenticated() {
            println!("Session ended. Please log in again.");
            if !log_in(app).await? {
                return Ok(());
            }
        }

        println!();
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match Action::ALL[idx] {
            Action::Refresh => handle_refresh(app).await,
            Action::Filter => handle_filter(app),
            Action::Show => handle_show(app),
            Action::SetStatus => handle_set_status(app).await,
            Action::Export => handle_export(app).await,
            Action::Plan => handle_plan(app).await,
            Action::Quit => {
                app.logout();
                return Ok(());
            }
        };

        if let Err(e) = result {
            eprintln!("Error: {e}");
        }
    }
}

/// Logs in and loads the dashboard, asking to try again after a failure.
///
/// Returns `false` if the operator gives up.
async fn log_in(app: &App) -> CliResult<bool> {
    until_success(
        || async move {
            app.login().await?;
            app.refresh().await
        },
        || {
            Ok(Confirm::new()
                .with_prompt("Try again?")
                .default(true)
                .interact()?)
        },
    )
    .await
}

/// Runs `attempt` until it succeeds or `retry` declines another try.
async fn until_success<F, Fut, R>(mut attempt: F, mut retry: R) -> CliResult<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CliResult>,
    R: FnMut() -> CliResult<bool>,
{
    loop {
        match attempt().await {
            Ok(()) => return Ok(true),
            Err(e) => {
                eprintln!("Error: {e}");
                if !retry()? {
                    return Ok(false);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_refresh(app: &App) -> CliResult {
    app.refresh().await?;
    app.print_dashboard();
    Ok(())
}

/// Prompts for each filter field. "All" leaves a field unset.
fn handle_filter(app: &App) -> CliResult {
    let severity = pick_optional("Severity", "All Severity", SeverityLabel::all())?;
    let status = pick_optional("Status", "All Status", ReportStatus::all())?;
    let emergency_type: String = Input::new()
        .with_prompt("Emergency type (blank for any)")
        .allow_empty(true)
        .interact_text()?;

    app.set_filter(FilterState {
        severity,
        status,
        emergency_type: Some(emergency_type.trim().to_string()).filter(|t| !t.is_empty()),
    });
    app.print_reports();
    Ok(())
}

fn pick_optional<T: Copy + std::fmt::Display>(
    prompt: &str,
    any_label: &str,
    values: &[T],
) -> CliResult<Option<T>> {
    let mut labels = vec![any_label.to_string()];
    labels.extend(values.iter().map(ToString::to_string));

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(idx.checked_sub(1).map(|i| values[i]))
}

/// Picks a report from the current table rows.
fn pick_report(app: &App) -> CliResult<Option<i64>> {
    let rows = app.console().visible_reports();
    if rows.is_empty() {
        println!("No reports match the current filters.");
        return Ok(None);
    }

    let labels: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                "#{:<5} {:<9} {:<13} {} ({})",
                r.id, r.severity_label, r.status, r.emergency_type, r.reporter_email
            )
        })
        .collect();

    let idx = Select::new()
        .with_prompt("Report")
        .items(&labels)
        .default(0)
        .max_length(20)
        .interact()?;

    Ok(Some(rows[idx].id))
}

fn handle_show(app: &App) -> CliResult {
    let Some(id) = pick_report(app)? else {
        return Ok(());
    };
    app.show(id)
}

async fn handle_set_status(app: &App) -> CliResult {
    let id = match app.console().selected() {
        Some(report)
            if Confirm::new()
                .with_prompt(format!("Update report #{} (open in detail view)?", report.id))
                .default(true)
                .interact()? =>
        {
            report.id
        }
        _ => match pick_report(app)? {
            Some(id) => id,
            None => return Ok(()),
        },
    };

    let targets = TransitionTarget::all();
    let labels: Vec<String> = targets.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt(format!("New status for report #{id}"))
        .items(&labels)
        .interact()?;

    app.set_status(id, targets[idx]).await
}

async fn handle_export(app: &App) -> CliResult {
    let output: String = Input::new()
        .with_prompt("Save PDF to")
        .default(DEFAULT_EXPORT_FILE.to_string())
        .interact_text()?;
    app.export(&PathBuf::from(output)).await
}

async fn handle_plan(app: &App) -> CliResult {
    let incident_text: String = Input::new()
        .with_prompt("Describe the incident")
        .interact_text()?;
    let latitude: f64 = Input::new().with_prompt("Latitude").interact_text()?;
    let longitude: f64 = Input::new().with_prompt("Longitude").interact_text()?;

    app.plan(&PlanRequest {
        incident_text,
        latitude,
        longitude,
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn failed_login_is_retried() {
        let attempts = Cell::new(0);
        let logged_in = until_success(
            || {
                attempts.set(attempts.get() + 1);
                let result: CliResult = if attempts.get() < 3 {
                    Err("Invalid credentials".into())
                } else {
                    Ok(())
                };
                async move { result }
            },
            || Ok(true),
        )
        .await
        .unwrap();

        assert!(logged_in);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn declining_a_retry_stops_without_error() {
        let attempts = Cell::new(0);
        let logged_in = until_success(
            || {
                attempts.set(attempts.get() + 1);
                let result: CliResult = Err("Invalid credentials".into());
                async move { result }
            },
            || Ok(false),
        )
        .await
        .unwrap();

        assert!(!logged_in);
        assert_eq!(attempts.get(), 1);
    }
}
