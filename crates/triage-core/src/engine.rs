//! Triage request orchestration.
//!
//! A request moves through
//! `Idle -> SelectingRun -> FetchingArchive -> ExtractingSignal -> Classifying -> Done`
//! and can drop to `Failed` from any stage. Every transition is logged inside
//! a span that carries a fresh request id.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use actions_client::ActionsApi;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::archive::{extract_log_text, DEFAULT_TOP_K};
use crate::classifier::RuleSet;
use crate::domain::{
    assemble_report, ClassificationResult, Result, RunSelector, TriageError, TriageOutcome,
};
use crate::metrics::METRICS;
use crate::obs;
use crate::selection::select_run;
use crate::window::{extract_signal, DEFAULT_EXCERPT_LINES, DEFAULT_WINDOW_LINES};

/// Tunables for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageSettings {
    /// Trailing lines handed to the classifier.
    pub window_lines: usize,
    /// Trailing lines of the window kept for display.
    pub excerpt_lines: usize,
    /// Largest archive entries decoded.
    pub top_k: usize,
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            window_lines: DEFAULT_WINDOW_LINES,
            excerpt_lines: DEFAULT_EXCERPT_LINES,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl TriageSettings {
    /// Every bound at least one, excerpt no longer than the window.
    pub fn normalized(self) -> Self {
        let window_lines = self.window_lines.max(1);
        Self {
            window_lines,
            excerpt_lines: self.excerpt_lines.clamp(1, window_lines),
            top_k: self.top_k.max(1),
        }
    }
}

/// Request lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageStage {
    Idle,
    SelectingRun,
    FetchingArchive,
    ExtractingSignal,
    Classifying,
    Done,
    Failed,
}

impl fmt::Display for TriageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriageStage::Idle => "idle",
            TriageStage::SelectingRun => "selecting_run",
            TriageStage::FetchingArchive => "fetching_archive",
            TriageStage::ExtractingSignal => "extracting_signal",
            TriageStage::Classifying => "classifying",
            TriageStage::Done => "done",
            TriageStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Diagnosis of a log text that did not come from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDiagnosis {
    pub classification: ClassificationResult,
    pub excerpt: Vec<String>,
}

/// Window, excerpt and classify `text` with `rules`.
pub fn classify_log_text(text: &str, settings: TriageSettings, rules: &RuleSet) -> LocalDiagnosis {
    let settings = settings.normalized();
    let signal = extract_signal(text, settings.window_lines, settings.excerpt_lines);
    LocalDiagnosis {
        classification: rules.classify(&signal.window.joined()),
        excerpt: signal.excerpt,
    }
}

/// Stateless triage service. One `triage` call per request, safe to share
/// across tasks.
pub struct TriageEngine<A: ActionsApi> {
    api: A,
    settings: TriageSettings,
    rules: Arc<RuleSet>,
}

impl<A: ActionsApi> TriageEngine<A> {
    /// Engine with the canonical rule set.
    pub fn new(api: A, settings: TriageSettings) -> Self {
        Self::with_rules(api, settings, RuleSet::canonical())
    }

    pub fn with_rules(api: A, settings: TriageSettings, rules: Arc<RuleSet>) -> Self {
        Self {
            api,
            settings: settings.normalized(),
            rules,
        }
    }

    pub fn settings(&self) -> TriageSettings {
        self.settings
    }

    /// Diagnose the failed run picked by `selector`.
    ///
    /// Returns `TriageOutcome::NoFailedRuns` when the repository has no failed
    /// runs. A panic anywhere in the request is returned as
    /// `TriageError::Internal`.
    pub async fn triage(
        &self,
        owner: &str,
        repo: &str,
        selector: RunSelector,
    ) -> Result<TriageOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let repo_label = format!("{owner}/{repo}");
        let span = obs::tracing_span(&request_id, &repo_label);
        let started = Instant::now();
        let stage = Mutex::new(TriageStage::Idle);

        METRICS.inc_requests();
        span.in_scope(|| obs::emit_triage_started(&request_id, &repo_label, &selector.to_string()));

        let attempt = AssertUnwindSafe(self.run_stages(&request_id, owner, repo, selector, &stage))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        let result = match attempt {
            Ok(result) => result,
            Err(payload) => Err(TriageError::internal(panic_message(payload.as_ref()))),
        };

        let _entered = span.enter();
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(TriageOutcome::Report(report)) => {
                if report.classification.is_detected() {
                    METRICS.inc_classified();
                } else {
                    METRICS.inc_undetected();
                }
                obs::emit_triage_finished(
                    &request_id,
                    duration_ms,
                    "report",
                    report.classification.rule_id.as_deref(),
                );
            }
            Ok(TriageOutcome::NoFailedRuns) => {
                obs::emit_triage_finished(&request_id, duration_ms, "no_failed_runs", None);
            }
            Err(err) => {
                let failed_at = *stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                METRICS.inc_failed();
                obs::emit_triage_failed(&request_id, failed_at, err);
                obs::emit_triage_stage(&request_id, TriageStage::Failed);
            }
        }
        result
    }

    async fn run_stages(
        &self,
        request_id: &str,
        owner: &str,
        repo: &str,
        selector: RunSelector,
        stage: &Mutex<TriageStage>,
    ) -> Result<TriageOutcome> {
        let advance = |next: TriageStage| {
            *stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
            obs::emit_triage_stage(request_id, next);
        };

        if owner.trim().is_empty() {
            return Err(TriageError::MissingConfiguration(
                "repository owner (GITHUB_OWNER)".to_string(),
            ));
        }
        if repo.trim().is_empty() {
            return Err(TriageError::MissingConfiguration(
                "repository name (GITHUB_REPO)".to_string(),
            ));
        }

        advance(TriageStage::SelectingRun);
        let Some(run) = select_run(&self.api, owner, repo, selector).await? else {
            advance(TriageStage::Done);
            return Ok(TriageOutcome::NoFailedRuns);
        };
        debug!(run_id = %run.id, url = %run.html_url, "Selected run");

        advance(TriageStage::FetchingArchive);
        let bytes = self.api.get_log_archive(owner, repo, run.id).await?;
        debug!(run_id = %run.id, bytes = bytes.len(), "Fetched log archive");

        advance(TriageStage::ExtractingSignal);
        let logs = extract_log_text(&bytes, self.settings.top_k)?;
        let signal = extract_signal(
            &logs.text,
            self.settings.window_lines,
            self.settings.excerpt_lines,
        );

        advance(TriageStage::Classifying);
        let classification = self.rules.classify(&signal.window.joined());

        advance(TriageStage::Done);
        Ok(TriageOutcome::Report(assemble_report(
            run,
            classification,
            signal.excerpt,
            logs.summary,
        )))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic during triage: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic during triage: {message}")
    } else {
        "panic during triage".to_string()
    }
}
