//! CI Triage Core Library
//!
//! Picks a failed GitHub Actions run, reads its log archive and names the
//! most likely cause of the failure with a fixed, ordered rule set.
//!
//! ## Layer 1 - Triage
//!
//! - [`selection`]: which run a request targets
//! - [`archive`]: ranking and decoding of the log zip
//! - [`window`]: trailing analysis window and excerpt
//! - [`classifier`]: first-match-wins rule table
//! - [`engine`]: request orchestration on top of [`actions_client::ActionsApi`]

pub mod archive;
pub mod classifier;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod obs;
pub mod selection;
pub mod telemetry;
pub mod window;

pub use archive::{extract_log_text, ArchiveEntry, ExtractedLogs, LogArchive, DEFAULT_TOP_K};
pub use classifier::{classify, Rule, RuleDescription, RuleSet, CANONICAL_RULES};
pub use domain::{
    assemble_report, ArchiveSummary, ClassificationResult, Result, RunSelector, TriageError,
    TriageOutcome, TriageReport, MAX_RECENT_INDEX, UNDETECTED_ADVICE, UNDETECTED_TITLE,
};
pub use engine::{classify_log_text, LocalDiagnosis, TriageEngine, TriageSettings, TriageStage};
pub use selection::select_run;
pub use window::{
    extract_signal, AnalysisWindow, SignalWindow, DEFAULT_EXCERPT_LINES, DEFAULT_WINDOW_LINES,
};

pub use actions_client::{RunId, RunStatus, WorkflowRun};

pub use metrics::METRICS;
pub use obs::{
    emit_triage_failed, emit_triage_finished, emit_triage_stage, emit_triage_started, tracing_span,
};
pub use telemetry::init_tracing;

/// Triage version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
