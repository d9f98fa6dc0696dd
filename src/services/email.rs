use crate::services::report::{self, ReportPayload};

/// Stand-in email collaborator: renders the report into the structured log.
/// A real deployment would swap this for an SMTP or API-backed sender.
pub fn send_report(report: &ReportPayload) {
    tracing::info!(
        to = %report.email,
        username = %report.username,
        latest_level = %report.latest_level,
        wellness_points = report.wellness_points,
        generated_at = %report::generated_at(),
        "wellness report dispatched"
    );
    if let Some(resources) = &report.crisis_resources {
        for line in resources {
            tracing::info!(to = %report.email, "crisis resource included: {line}");
        }
    }
}
