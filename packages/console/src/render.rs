//! Plain-text views of the console state.
//!
//! Each view is a borrowing wrapper implementing [`fmt::Display`], so the
//! CLI can `println!` it directly.

use std::fmt;

use triage_report_models::Report;

use crate::ComponentErrors;
use crate::inspector::DetailInspector;
use crate::metrics::Summary;
use crate::projection::{ChartPanel, PanelBody};

/// Width of the longest bar in a chart panel.
const BAR_WIDTH: u64 = 30;

/// The four metric cards.
pub struct MetricCards(pub Summary);

impl fmt::Display for MetricCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Summary {
            total,
            critical,
            pending,
            resolved,
        } = self.0;
        writeln!(f, "{:<22}{total:>6}", "Total Reports")?;
        writeln!(f, "{:<22}{critical:>6}", "Critical Cases")?;
        writeln!(f, "{:<22}{pending:>6}", "Pending Verification")?;
        write!(f, "{:<22}{resolved:>6}", "Resolved Cases")
    }
}

fn display_time(report: &Report) -> String {
    report.created_at_utc().map_or_else(
        || report.created_at.clone(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let head: String = value.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

/// The report table: one row per report, in the given order.
pub struct ReportTable<'a>(pub &'a [Report]);

impl fmt::Display for ReportTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No reports match the current filters.");
        }

        writeln!(
            f,
            "{:<6} {:<17} {:<28} {:<16} {:<9} {:<7} STATUS",
            "ID", "TIME", "USER", "TYPE", "SEVERITY", "VERIFY"
        )?;
        writeln!(f, "{}", "-".repeat(100))?;

        for r in self.0 {
            let verify = if r.suspicious {
                format!("{:.2}!", r.verification_score)
            } else {
                format!("{:.2}", r.verification_score)
            };
            writeln!(
                f,
                "{:<6} {:<17} {:<28} {:<16} {:<9} {:<7} {}",
                r.id,
                display_time(r),
                truncate(&r.reporter_email, 28),
                truncate(&r.emergency_type, 16),
                r.severity_label,
                verify,
                r.status,
            )?;
        }

        write!(f, "\n{} report(s)", self.0.len())
    }
}

/// One chart panel as horizontal bars.
pub struct PanelView<'a>(pub &'a ChartPanel);

impl fmt::Display for PanelView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let panel = self.0;
        writeln!(f, "== {} ==", panel.title)?;

        match &panel.body {
            PanelBody::Empty { message } => write!(f, "{message}"),
            PanelBody::Series(bars) => {
                let max = bars.iter().map(|b| b.value).max().unwrap_or(0).max(1);
                for (i, bar) in bars.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    let scaled = u128::from(bar.value) * u128::from(BAR_WIDTH) / u128::from(max);
                    let len = usize::try_from(scaled).unwrap_or(0);
                    write!(
                        f,
                        "{:<14} {:<30} {:>5}  {}",
                        truncate(&bar.label, 14),
                        "#".repeat(len),
                        bar.value,
                        bar.color
                    )?;
                }
                Ok(())
            }
            PanelBody::Users(users) => {
                for (i, user) in users.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{:<32} Risk: {}", user.email, user.risk_score)?;
                }
                Ok(())
            }
        }
    }
}

/// Inline error lines, one per failing component.
pub struct ErrorBanner<'a>(pub &'a ComponentErrors);

impl fmt::Display for ErrorBanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = [
            ("Reports", &self.0.reports),
            ("Analytics", &self.0.analytics),
            ("Status update", &self.0.transition),
        ];
        let mut first = true;
        for (name, message) in slots {
            if let Some(message) = message {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                write!(f, "[{name}] {message}")?;
            }
        }
        Ok(())
    }
}

/// The detail view of one report.
pub struct ReportDetail<'a> {
    /// The report shown.
    pub report: &'a Report,
    /// API base URL, prefixed to the server-relative image paths.
    pub api_base_url: &'a str,
}

impl fmt::Display for ReportDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        writeln!(f, "Report #{} - {}", r.id, r.emergency_type)?;
        writeln!(f, "Submitted:    {}", display_time(r))?;
        writeln!(f, "User:         {}", r.reporter_email)?;
        if let Some(risk) = r.risk_score {
            let flagged = if r.account_flagged == Some(true) {
                " (flagged)"
            } else {
                ""
            };
            writeln!(f, "Account risk: {risk}{flagged}")?;
        }
        writeln!(f, "Description:  {}", r.description)?;
        writeln!(
            f,
            "Severity:     {} ({})",
            r.severity_label, r.severity_confidence
        )?;
        writeln!(
            f,
            "Verification: {} | suspicious: {}",
            r.verification_score,
            if r.suspicious { "yes" } else { "no" }
        )?;
        writeln!(f, "Status:       {}", r.status)?;
        writeln!(f, "Selfie:       {}{}", self.api_base_url, r.selfie_url)?;
        writeln!(f, "Incident:     {}{}", self.api_base_url, r.accident_url)?;
        writeln!(f, "Navigate:     {}", r.map_url())?;

        let actions: Vec<String> = DetailInspector::actions()
            .iter()
            .map(ToString::to_string)
            .collect();
        write!(f, "Actions:      {}", actions.join(" | "))
    }
}
