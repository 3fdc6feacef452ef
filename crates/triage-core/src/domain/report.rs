//! Triage results handed to the rendering collaborator.

use actions_client::WorkflowRun;
use serde::{Deserialize, Serialize};

/// Title of the fallback classification.
pub const UNDETECTED_TITLE: &str = "Couldn’t auto-detect the exact cause";

/// Advice of the fallback classification.
pub const UNDETECTED_ADVICE: &str = "Scan the last lines above for the first clear error…";

/// Diagnosis of a failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Id of the matching rule; `None` for the fallback.
    pub rule_id: Option<String>,

    /// Human-readable failure category.
    pub title: String,

    /// Remediation advice, placeholder already resolved.
    pub advice: String,

    /// Value captured by the matching rule, if any.
    pub captured: Option<String>,
}

impl ClassificationResult {
    /// The "couldn't auto-detect" result.
    pub fn undetected() -> Self {
        Self {
            rule_id: None,
            title: UNDETECTED_TITLE.to_string(),
            advice: UNDETECTED_ADVICE.to_string(),
            captured: None,
        }
    }

    /// Whether a rule matched.
    pub fn is_detected(&self) -> bool {
        self.rule_id.is_some()
    }
}

/// What was read from the log archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of log files in the archive.
    pub entries_total: usize,

    /// Names of the entries analysed, largest first.
    pub entries_analyzed: Vec<String>,

    /// SHA-256 of the archive bytes (hex).
    pub digest: String,
}

/// Everything the renderer needs for one failed run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageReport {
    pub run: WorkflowRun,
    pub classification: ClassificationResult,
    /// Trailing log lines, oldest first.
    pub excerpt: Vec<String>,
    pub archive: ArchiveSummary,
}

/// Terminal result of a successful triage request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriageOutcome {
    /// A failed run was found and classified.
    Report(TriageReport),

    /// The listing had no failed runs at all.
    NoFailedRuns,
}

/// Package the pieces of a finished triage into a report.
pub fn assemble_report(
    run: WorkflowRun,
    classification: ClassificationResult,
    excerpt: Vec<String>,
    archive: ArchiveSummary,
) -> TriageReport {
    TriageReport {
        run,
        classification,
        excerpt,
        archive,
    }
}
