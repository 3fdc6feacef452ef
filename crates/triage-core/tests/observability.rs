//! Observability tests for the triage request lifecycle.
//!
//! These tests verify that structured tracing events are emitted for
//! request start, stage transitions, finish and failure.

mod common;

use actions_client::fakes::FakeActionsApi;
use common::{failed_run, log_zip};
use triage_core::{
    emit_triage_failed, emit_triage_finished, emit_triage_stage, emit_triage_started, RunId,
    RunSelector, tracing_span, TriageEngine, TriageSettings, TriageStage,
};
use tracing_test::traced_test;

/// Test: emit_triage_started creates an info-level event
#[traced_test]
#[test]
fn test_emit_triage_started_logs_selector() {
    emit_triage_started("req-123", "acme/widgets", "#2");
    assert!(logs_contain("triage.started"));
    assert!(logs_contain("req-123"));
}

/// Test: emit_triage_stage names the stage
#[traced_test]
#[test]
fn test_emit_triage_stage_logs_stage_name() {
    emit_triage_stage("req-456", TriageStage::FetchingArchive);
    assert!(logs_contain("fetching_archive"));
}

/// Test: emit_triage_finished logs the rule id, or "none"
#[traced_test]
#[test]
fn test_emit_triage_finished_logs_rule() {
    emit_triage_finished("req-789", 120, "report", Some("module_not_found"));
    emit_triage_finished("req-790", 3, "no_failed_runs", None);
    assert!(logs_contain("module_not_found"));
    assert!(logs_contain("no_failed_runs"));
}

/// Test: emit_triage_failed creates a warn-level event
#[traced_test]
#[test]
fn test_emit_triage_failed_logs_warning() {
    let error_msg = "GitHub API unreachable";
    emit_triage_failed("req-err-001", TriageStage::SelectingRun, &error_msg);
    assert!(logs_contain("WARN"));
    assert!(logs_contain("GitHub API unreachable"));
}

/// Test: events inside the request span carry its request id
#[traced_test]
#[test]
fn test_request_span_tags_events() {
    let span = tracing_span("req-span", "acme/widgets").entered();
    tracing::info!("inside request");
    drop(span);
    assert!(logs_contain("req-span"));
}

/// Test: a full request logs every stage up to done
#[traced_test]
#[tokio::test]
async fn test_triage_emits_lifecycle_events() {
    let api = FakeActionsApi::new().with_run(failed_run(11, 1)).with_archive(
        RunId(11),
        log_zip(&[("job.txt", "sh: 1: ./deploy.sh: Permission denied\n")]),
    );
    let engine = TriageEngine::new(api, TriageSettings::default());

    engine
        .triage("acme", "widgets", RunSelector::Latest)
        .await
        .unwrap();

    assert!(logs_contain("triage.started"));
    assert!(logs_contain("selecting_run"));
    assert!(logs_contain("fetching_archive"));
    assert!(logs_contain("extracting_signal"));
    assert!(logs_contain("classifying"));
    assert!(logs_contain("triage.finished"));
    assert!(logs_contain("permission_denied"));
}

/// Test: a failing request logs the stage it failed in
#[traced_test]
#[tokio::test]
async fn test_failed_triage_emits_failure_event() {
    let api = FakeActionsApi::new()
        .with_run(failed_run(12, 1))
        .with_archive(RunId(12), b"garbage".to_vec());
    let engine = TriageEngine::new(api, TriageSettings::default());

    let result = engine
        .triage("acme", "widgets", RunSelector::Latest)
        .await;

    assert!(result.is_err());
    assert!(logs_contain("triage.failed"));
    assert!(logs_contain("extracting_signal"));
}
