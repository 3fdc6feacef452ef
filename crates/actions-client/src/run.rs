//! Workflow run records as returned by the Actions API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a workflow run, folded from the API's `status` and `conclusion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Failure,
    Success,
    Cancelled,
    TimedOut,
    ActionRequired,
    InProgress,
    Queued,
    Unknown,
}

impl RunStatus {
    /// Fold the API's two-field state into one status.
    ///
    /// A completed run reports its conclusion; anything else reports its status.
    pub fn from_api(status: &str, conclusion: Option<&str>) -> Self {
        match (status, conclusion) {
            ("completed", Some("failure")) => RunStatus::Failure,
            ("completed", Some("success")) => RunStatus::Success,
            ("completed", Some("cancelled")) => RunStatus::Cancelled,
            ("completed", Some("timed_out")) => RunStatus::TimedOut,
            ("completed", Some("action_required")) => RunStatus::ActionRequired,
            ("in_progress", _) => RunStatus::InProgress,
            ("queued" | "waiting" | "pending" | "requested", _) => RunStatus::Queued,
            _ => RunStatus::Unknown,
        }
    }
}

/// A single workflow run. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRun {
    /// Run identifier.
    pub id: RunId,

    /// Workflow name, when the API reports one.
    pub name: Option<String>,

    /// Branch the run was triggered on.
    pub head_branch: Option<String>,

    /// Browser URL of the run.
    pub html_url: String,

    /// When the run was created.
    pub created_at: DateTime<Utc>,

    /// Folded run status.
    pub status: RunStatus,
}

impl WorkflowRun {
    /// Create a run record with no name or branch.
    pub fn new(
        id: u64,
        html_url: impl Into<String>,
        created_at: DateTime<Utc>,
        status: RunStatus,
    ) -> Self {
        Self {
            id: RunId(id),
            name: None,
            head_branch: None,
            html_url: html_url.into(),
            created_at,
            status,
        }
    }

    /// Set the workflow name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the head branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.head_branch = Some(branch.into());
        self
    }
}

/// Wire shape of a run in the API payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRun {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    head_branch: Option<String>,
    html_url: String,
    created_at: DateTime<Utc>,
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
}

impl From<ApiRun> for WorkflowRun {
    fn from(raw: ApiRun) -> Self {
        let status = RunStatus::from_api(&raw.status, raw.conclusion.as_deref());
        WorkflowRun {
            id: RunId(raw.id),
            name: raw.name,
            head_branch: raw.head_branch,
            html_url: raw.html_url,
            created_at: raw.created_at,
            status,
        }
    }
}

/// Wire shape of the run listing payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiRunList {
    #[serde(default)]
    pub(crate) workflow_runs: Vec<ApiRun>,
}
