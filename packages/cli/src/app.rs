//! Console operations shared by the subcommands and the interactive menu.

use std::path::Path;

use triage_api::ConsoleApi;
use triage_api::client::HttpConsoleApi;
use triage_api::config::ConsoleConfig;
use triage_cli_utils::{MultiProgress, request_spinner};
use triage_console::Console;
use triage_console::render::{ErrorBanner, MetricCards, PanelView, ReportDetail, ReportTable};
use triage_plan::PlanRequest;
use triage_plan::client::HttpPlanService;
use triage_plan::form::{BUSY_LABEL, PlanForm};
use triage_plan::render::PlanView;
use triage_report_models::{FilterState, TransitionTarget};

/// Default file name for the PDF export.
pub const DEFAULT_EXPORT_FILE: &str = "emergency_reports_summary.pdf";

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// A logged-out console plus the bits the CLI needs around it.
pub struct App {
    console: Console<HttpConsoleApi>,
    config: ConsoleConfig,
    multi: MultiProgress,
    plan_form: PlanForm,
}

impl App {
    /// Builds the HTTP client for `config`.
    pub fn new(config: ConsoleConfig, multi: MultiProgress) -> CliResult<Self> {
        let api = HttpConsoleApi::new(&config)?;
        Ok(Self {
            console: Console::new(api),
            config,
            multi,
            plan_form: PlanForm::new(),
        })
    }

    pub const fn console(&self) -> &Console<HttpConsoleApi> {
        &self.console
    }

    /// Checks API connectivity.
    pub async fn health(&self) -> CliResult {
        let spinner = request_spinner(&self.multi, "Checking API health...");
        let result = self.console.api().health().await;
        spinner.finish_and_clear();

        if result? {
            println!("API at {} is healthy", self.config.api_base_url);
        } else {
            println!("API at {} responded but is not healthy", self.config.api_base_url);
        }
        Ok(())
    }

    /// Logs in with env or prompted credentials.
    pub async fn login(&self) -> CliResult {
        let creds = triage_cli_utils::credentials_from_env_or_prompt()?;
        let spinner = request_spinner(&self.multi, "Logging in...");
        let result = self.console.login(&creds.email, &creds.password).await;
        spinner.finish_and_clear();

        let operator = result?;
        println!("Logged in as {} ({})", operator.email, operator.role);
        Ok(())
    }

    /// Reloads reports and analytics and prints any component errors.
    pub async fn refresh(&self) -> CliResult {
        let spinner = request_spinner(&self.multi, "Loading reports and analytics...");
        let outcome = self.console.refresh().await;
        spinner.finish_and_clear();

        let outcome = outcome?;
        if outcome.is_ok() {
            log::debug!("Loaded {} reports", self.console.reports().len());
        }
        self.print_errors();
        Ok(())
    }

    pub fn print_errors(&self) {
        let errors = self.console.errors();
        if errors.any() {
            eprintln!("{}", ErrorBanner(&errors));
        }
    }

    pub fn print_metrics(&self) {
        println!("{}", MetricCards(self.console.metrics()));
    }

    pub fn print_analytics(&self) {
        for panel in self.console.panels() {
            println!("{}\n", PanelView(&panel));
        }
    }

    pub fn print_reports(&self) {
        println!("{}", ReportTable(&self.console.visible_reports()));
    }

    pub fn print_dashboard(&self) {
        self.print_metrics();
        println!();
        self.print_analytics();
        self.print_reports();
    }

    pub fn set_filter(&self, filter: FilterState) {
        self.console.set_filter(filter);
    }

    /// Opens report `id` in the detail view and prints it.
    pub fn show(&self, id: i64) -> CliResult {
        let report = self.console.select(id)?;
        println!(
            "{}",
            ReportDetail {
                report: &report,
                api_base_url: &self.config.api_base_url,
            }
        );
        Ok(())
    }

    /// Writes a status and prints the reloaded record.
    pub async fn set_status(&self, id: i64, target: TransitionTarget) -> CliResult {
        let spinner = request_spinner(&self.multi, &format!("Setting report #{id} to {target}..."));
        let result = self.console.set_status(id, target).await;
        spinner.finish_and_clear();

        result?;
        self.print_errors();
        match self.console.reports().get(id) {
            Some(report) => println!("Report #{id} is now {}", report.status),
            None => println!("Report #{id} updated; it is no longer in the list"),
        }
        Ok(())
    }

    /// Downloads the PDF summary to `output`.
    pub async fn export(&self, output: &Path) -> CliResult {
        let spinner = request_spinner(&self.multi, "Exporting PDF summary...");
        let result = self.console.export_pdf().await;
        spinner.finish_and_clear();

        let bytes = result?;
        std::fs::write(output, &bytes)?;
        println!("Wrote {} ({} bytes)", output.display(), bytes.len());
        Ok(())
    }

    /// Requests a response plan and prints it, or the error in its place.
    pub async fn plan(&self, request: &PlanRequest) -> CliResult {
        let service = HttpPlanService::new(&self.config)?;
        let spinner = request_spinner(&self.multi, BUSY_LABEL);
        let outcome = self.plan_form.submit(&service, request).await;
        spinner.finish_and_clear();

        println!("{}", PlanView(&outcome));
        Ok(())
    }

    pub fn logout(&self) {
        self.console.logout();
        println!("Logged out.");
    }
}
