//! Run selection policy.
//!
//! `ById` goes straight to the run; `Latest` and `NthRecent(n)` read a
//! failure listing of exactly `n` entries and take the n-th, newest first.

use actions_client::{ActionsApi, WorkflowRun};
use tracing::debug;

use crate::domain::{Result, RunSelector, TriageError};

/// Resolve `selector` to a run.
///
/// Returns `Ok(None)` when the listing holds no failed runs at all, and
/// `InsufficientRuns` when it holds some but fewer than requested.
pub async fn select_run<A: ActionsApi + ?Sized>(
    api: &A,
    owner: &str,
    repo: &str,
    selector: RunSelector,
) -> Result<Option<WorkflowRun>> {
    let requested = match (selector, selector.listing_size()) {
        (RunSelector::ById(id), _) => {
            debug!(run_id = %id, "Fetching run by id");
            return Ok(Some(api.get_run(owner, repo, id).await?));
        }
        (_, Some(n)) => n,
        (_, None) => 1,
    };

    let runs = api.list_failed_runs(owner, repo, requested).await?;
    pick_nth(runs, requested)
}

/// Pick the 1-based `requested` run from a newest-first listing.
pub fn pick_nth(runs: Vec<WorkflowRun>, requested: u32) -> Result<Option<WorkflowRun>> {
    if runs.is_empty() {
        return Ok(None);
    }
    let found = runs.len();
    let position = requested.max(1) as usize;
    runs.into_iter()
        .nth(position - 1)
        .map(Some)
        .ok_or(TriageError::InsufficientRuns { found, requested })
}
