//! Text views of a plan outcome.

use std::fmt;

use crate::{PlanError, ResponsePlan, SeverityBand, UnitRecommendation};

const NONE: &str = "None";
const NO_DATA: &str = "No data available.";

fn joined_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NONE.to_string()
    } else {
        items.join(", ")
    }
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    line: impl Fn(&T) -> String,
) -> fmt::Result {
    if items.is_empty() {
        return write!(f, "  {NO_DATA}");
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "  - {}", line(item))?;
    }
    Ok(())
}

fn recommendation_line(rec: &UnitRecommendation) -> String {
    format!(
        "{} | Suitability {} | ETA {} min | {} km",
        rec.unit_id, rec.suitability, rec.eta_minutes, rec.distance_km
    )
}

/// The triage card, or the error shown in its place.
pub struct TriageCard<'a>(pub &'a Result<ResponsePlan, PlanError>);

impl fmt::Display for TriageCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = match self.0 {
            Ok(plan) => plan,
            Err(e) => return write!(f, "Error: {e}"),
        };
        let triage = &plan.triage;
        writeln!(f, "Incident type:  {}", triage.incident_type)?;
        writeln!(
            f,
            "Severity:       {}/10 [{}]",
            triage.severity_score,
            SeverityBand::from_score(triage.severity_score)
        )?;
        writeln!(f, "Urgent signals: {}", joined_or_none(&triage.urgent_signals))?;
        write!(f, "Risk context:   {}", joined_or_none(&plan.risk_context))
    }
}

/// The full plan: triage card, unit recommendations, and actions.
pub struct PlanView<'a>(pub &'a Result<ResponsePlan, PlanError>);

impl fmt::Display for PlanView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", TriageCard(self.0))?;
        let Ok(plan) = self.0 else {
            return Ok(());
        };

        writeln!(f, "\n\nRecommended units:")?;
        write_list(f, &plan.recommendations, recommendation_line)?;
        writeln!(f, "\n\nActions:")?;
        write_list(f, &plan.actions, Clone::clone)
    }
}
