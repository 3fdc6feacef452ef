//! Domain models for CI triage.
//!
//! Canonical definitions for the request-level entities:
//! - `RunSelector`: which failed run a request targets
//! - `ClassificationResult`: diagnosis produced by the rule set
//! - `TriageReport` / `TriageOutcome`: what the caller renders
//! - `TriageError`: everything that can stop a request

pub mod error;
pub mod report;
pub mod selector;

// Re-export main types and errors
pub use error::{Result, TriageError};
pub use report::{
    assemble_report, ArchiveSummary, ClassificationResult, TriageOutcome, TriageReport,
    UNDETECTED_ADVICE, UNDETECTED_TITLE,
};
pub use selector::{RunSelector, MAX_RECENT_INDEX};
