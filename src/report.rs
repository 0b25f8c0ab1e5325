use crate::apply::ApplyOutcome;
use crate::error::Error;
use crate::run::RunReport;
use crate::validate::{CountPolicy, Validation, counted};

/// Format a run as a per-hook table followed by totals.
pub fn format_summary(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<20} {:<16} {}\n", "Hook", "Outcome", "Via"));
    out.push_str(&format!("{}\n", "-".repeat(48)));

    for hook in &report.hooks {
        let (outcome, via) = match hook.outcome {
            ApplyOutcome::Applied { strategy } => ("applied", format!("strategy {strategy}")),
            ApplyOutcome::AlreadyPresent => ("already present", String::new()),
            ApplyOutcome::NotFound if hook.optional => ("not found", "(optional)".to_string()),
            ApplyOutcome::NotFound => ("NOT FOUND", String::new()),
        };
        out.push_str(format!("{:<20} {:<16} {}", hook.name, outcome, via).trim_end());
        out.push('\n');
    }

    out.push_str(&format!(
        "\n{} applied, {} already present, {} not found\n",
        report.applied(),
        report.already_present(),
        report.not_found()
    ));
    out
}

/// One-line verdict for the threshold check.
pub fn format_verdict(
    report: &RunReport,
    validation: Validation,
    minimum: usize,
    policy: CountPolicy,
) -> String {
    let counted = counted(report, policy);
    let what = match policy {
        CountPolicy::Installed => "hook(s) in place",
        CountPolicy::FreshOnly => "hook(s) newly applied",
    };
    match validation {
        Validation::Pass => format!("ok: {counted} {what} (minimum {minimum})\n"),
        Validation::Fail { .. } => format!("FAILED: {counted} {what}, expected at least {minimum}\n"),
    }
}

/// Render the report as pretty-printed JSON.
pub fn to_json(report: &RunReport) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(report)?)
}
