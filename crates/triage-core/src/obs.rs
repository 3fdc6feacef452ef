//! Structured observability hooks for the triage request lifecycle.
//!
//! This module provides:
//! - A request-scoped tracing span, attached to the request future
//! - Emission functions for start, stage transitions, finish and failure
//!
//! Events are emitted at `info!` level, failures at `warn!`. Filter with
//! `RUST_LOG`; pass `--json` to the CLI for JSON lines.

use tracing::{info, warn};

use crate::engine::TriageStage;

/// Build the request span without entering it, for `Instrument` on futures.
pub fn tracing_span(request_id: &str, repo: &str) -> tracing::Span {
    tracing::info_span!("triage.request", request_id = %request_id, repo = %repo)
}

/// Emit event: triage started for a selector.
pub fn emit_triage_started(request_id: &str, repo: &str, selector: &str) {
    info!(
        event = "triage.started",
        request_id = %request_id,
        repo = %repo,
        selector = %selector,
    );
}

/// Emit event: the request moved to a new stage.
pub fn emit_triage_stage(request_id: &str, stage: TriageStage) {
    info!(event = "triage.stage", request_id = %request_id, stage = %stage);
}

/// Emit event: triage finished with an outcome.
///
/// `rule_id` is `None` for the fallback diagnosis and for runs with nothing
/// to analyse.
pub fn emit_triage_finished(
    request_id: &str,
    duration_ms: u64,
    outcome: &str,
    rule_id: Option<&str>,
) {
    info!(
        event = "triage.finished",
        request_id = %request_id,
        duration_ms = duration_ms,
        outcome = %outcome,
        rule_id = rule_id.unwrap_or("none"),
    );
}

/// Emit event: triage failed (warning level).
pub fn emit_triage_failed(request_id: &str, stage: TriageStage, error: &dyn std::fmt::Display) {
    warn!(
        event = "triage.failed",
        request_id = %request_id,
        stage = %stage,
        error = %error,
    );
}
