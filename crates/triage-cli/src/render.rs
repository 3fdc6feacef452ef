//! Text and JSON rendering of triage results.

use std::fmt::Write as _;

use serde::Serialize;
use triage_core::{
    ArchiveSummary, ClassificationResult, RuleDescription, TriageError, TriageOutcome,
    TriageReport,
};

/// Shown for [`TriageOutcome::NoFailedRuns`].
pub const NO_FAILED_RUNS: &str = "No failed runs found recently.";

/// Result of classifying a local file.
#[derive(Debug, Clone, Serialize)]
pub struct LocalReport {
    pub source: String,
    pub classification: ClassificationResult,
    pub excerpt: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveSummary>,
}

pub fn outcome_text(outcome: &TriageOutcome) -> String {
    match outcome {
        TriageOutcome::NoFailedRuns => NO_FAILED_RUNS.to_string(),
        TriageOutcome::Report(report) => report_text(report),
    }
}

fn report_text(report: &TriageReport) -> String {
    let run = &report.run;
    let mut out = String::new();
    let _ = writeln!(out, "Failed run: {}", run.html_url);

    let mut details = vec![format!("run {}", run.id)];
    if let Some(name) = &run.name {
        details.push(format!("workflow {name}"));
    }
    if let Some(branch) = &run.head_branch {
        details.push(format!("branch {branch}"));
    }
    details.push(run.created_at.format("%Y-%m-%d %H:%M UTC").to_string());
    let _ = writeln!(out, "            {}", details.join(", "));

    out.push_str(&classification_text(&report.classification));
    out.push_str(&archive_text(&report.archive));
    out.push_str(&excerpt_text(&report.excerpt));
    out
}

pub fn local_text(report: &LocalReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Source:     {}", report.source);
    out.push_str(&classification_text(&report.classification));
    if let Some(archive) = &report.archive {
        out.push_str(&archive_text(archive));
    }
    out.push_str(&excerpt_text(&report.excerpt));
    out
}

fn classification_text(classification: &ClassificationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Diagnosis:  {}", classification.title);
    let _ = writeln!(out, "Advice:     {}", classification.advice);
    if let Some(rule) = &classification.rule_id {
        let _ = writeln!(out, "Rule:       {rule}");
    }
    out
}

fn archive_text(archive: &ArchiveSummary) -> String {
    format!(
        "Analyzed:   {} (of {} log files)\n",
        archive.entries_analyzed.join(", "),
        archive.entries_total
    )
}

fn excerpt_text(excerpt: &[String]) -> String {
    if excerpt.is_empty() {
        return "\n(log is empty)\n".to_string();
    }
    let mut out = format!("\nLast {} lines:\n", excerpt.len());
    for line in excerpt {
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn rules_text(rules: &[RuleDescription]) -> String {
    let width = rules.iter().map(|r| r.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for rule in rules {
        let _ = writeln!(
            out,
            "{:>2}. {:<width$}  {}",
            rule.position,
            rule.id,
            rule.title,
            width = width
        );
    }
    out
}

/// Pretty JSON for any serializable result.
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One user-facing line for a failed command, plus a hint where one helps.
pub fn error_text(err: &anyhow::Error) -> String {
    let Some(triage) = err.downcast_ref::<TriageError>() else {
        return format!("error: {err:#}");
    };
    let hint = match triage {
        TriageError::MissingConfiguration(_) => {
            Some("pass --owner/--repo/--token or set GITHUB_OWNER, GITHUB_REPO and GITHUB_TOKEN")
        }
        TriageError::InsufficientRuns { .. } => Some("pick a smaller position"),
        TriageError::InvalidSelector(_) => {
            Some("examples: `ci-triage triage`, `ci-triage triage 2`, `ci-triage triage id 123456`")
        }
        other if other.is_nothing_to_analyze() => {
            Some("the run's logs hold nothing to analyze; check them on GitHub or retry a different run")
        }
        _ => None,
    };
    match hint {
        Some(hint) => format!("error: {triage}\nhint: {hint}"),
        None => format!("error: {triage}"),
    }
}
