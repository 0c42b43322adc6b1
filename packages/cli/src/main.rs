#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Operations console for triaging citizen-submitted emergency reports.
//!
//! ```text
//! triage health
//! triage reports [--severity Critical] [--status Pending] [--type fire]
//! triage dashboard [filters]
//! triage metrics
//! triage analytics
//! triage show <id>
//! triage set-status <id> <Verified|Dispatched|Resolved|Rejected>
//! triage export [--output emergency_reports_summary.pdf]
//! triage plan "<incident text>" --lat <lat> --lng <lng>
//! ```
//!
//! Running `triage` with no subcommand logs in and enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`triage_cli_utils::init_logger`]) so
//! that log lines and request spinners never fight for the terminal.

mod app;
mod interactive;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use triage_api::config::ConsoleConfig;
use triage_plan::PlanRequest;
use triage_report_models::{FilterState, ReportStatus, SeverityLabel, TransitionTarget};

use crate::app::{App, DEFAULT_EXPORT_FILE};

#[derive(Parser)]
#[command(
    name = "triage",
    about = "Operations console for triaging citizen emergency reports"
)]
struct Cli {
    /// Config file (defaults to $TRIAGE_CONFIG, then ./triage_console.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Table filters shared by the listing commands.
#[derive(Args)]
struct FilterArgs {
    /// Exact severity (Low, Medium, Critical)
    #[arg(long)]
    severity: Option<SeverityLabel>,
    /// Exact status (e.g. Pending, "Needs Review", Resolved)
    #[arg(long)]
    status: Option<ReportStatus>,
    /// Case-insensitive substring of the emergency type
    #[arg(long = "type")]
    emergency_type: Option<String>,
}

impl From<FilterArgs> for FilterState {
    fn from(args: FilterArgs) -> Self {
        Self {
            severity: args.severity,
            status: args.status,
            emergency_type: args.emergency_type.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the reports API is reachable
    Health,
    /// List reports
    Reports {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Metric cards, analytics panels, and the report table
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show the metric cards
    Metrics,
    /// Show the analytics panels
    Analytics,
    /// Show one report in detail
    Show {
        /// Report ID
        id: i64,
    },
    /// Set a report's status
    SetStatus {
        /// Report ID
        id: i64,
        /// New status (Verified, Dispatched, Resolved, Rejected)
        status: TransitionTarget,
    },
    /// Download the PDF summary
    Export {
        /// Output file
        #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
    /// Request an AI response plan for an incident
    Plan {
        /// Incident description
        text: String,
        /// Incident latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Incident longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<ConsoleConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            ConsoleConfig::from_file(&path)?.with_overrides(|key| std::env::var(key).ok())?
        }
        None => ConsoleConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = triage_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = load_config(cli.config)?;
    let app = App::new(config, multi)?;

    let Some(command) = cli.command else {
        return interactive::run(&app).await;
    };

    match command {
        Commands::Health => app.health().await?,
        Commands::Plan { text, lat, lng } => {
            app.plan(&PlanRequest {
                incident_text: text,
                latitude: lat,
                longitude: lng,
            })
            .await?;
        }
        Commands::SetStatus { id, status } => {
            app.login().await?;
            app.set_status(id, status).await?;
        }
        Commands::Export { output } => {
            app.login().await?;
            app.export(&output).await?;
        }
        Commands::Reports { filter } => {
            app.login().await?;
            app.refresh().await?;
            app.set_filter(filter.into());
            app.print_reports();
        }
        Commands::Dashboard { filter } => {
            app.login().await?;
            app.refresh().await?;
            app.set_filter(filter.into());
            app.print_dashboard();
        }
        Commands::Metrics => {
            app.login().await?;
            app.refresh().await?;
            app.print_metrics();
        }
        Commands::Analytics => {
            app.login().await?;
            app.refresh().await?;
            app.print_analytics();
        }
        Commands::Show { id } => {
            app.login().await?;
            app.refresh().await?;
            app.show(id)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_status_parses_target_names() {
        let cli = Cli::try_parse_from(["triage", "set-status", "7", "Resolved"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::SetStatus {
                id: 7,
                status: TransitionTarget::Resolved,
            })
        ));
    }

    #[test]
    fn filter_flags_parse_enum_values() {
        let cli = Cli::try_parse_from([
            "triage",
            "reports",
            "--severity",
            "Critical",
            "--status",
            "Needs Review",
            "--type",
            "fire",
        ])
        .unwrap();
        let Some(Commands::Reports { filter }) = cli.command else {
            panic!("expected the reports command");
        };

        let filter = FilterState::from(filter);
        assert_eq!(filter.severity, Some(SeverityLabel::Critical));
        assert_eq!(filter.status, Some(ReportStatus::NeedsReview));
        assert_eq!(filter.emergency_type.as_deref(), Some("fire"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Cli::try_parse_from(["triage", "set-status", "7", "Pending"]).is_err());
    }
}
