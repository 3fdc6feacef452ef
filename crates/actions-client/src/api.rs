//! The `ActionsApi` seam between triage logic and the hosting API.

use std::sync::Arc;

use async_trait::async_trait;

use crate::run::{RunId, WorkflowRun};
use crate::Result;

/// Read access to workflow runs and their log archives.
///
/// `owner` and `repo` are raw identifiers; implementations are responsible
/// for encoding them before they reach a request path.
#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// List failed runs, newest first, at most `count` entries.
    async fn list_failed_runs(&self, owner: &str, repo: &str, count: u32)
        -> Result<Vec<WorkflowRun>>;

    /// Fetch a single run by identifier.
    async fn get_run(&self, owner: &str, repo: &str, id: RunId) -> Result<WorkflowRun>;

    /// Fetch the zipped log archive of a run.
    async fn get_log_archive(&self, owner: &str, repo: &str, id: RunId) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: ActionsApi + ?Sized> ActionsApi for Arc<T> {
    async fn list_failed_runs(
        &self,
        owner: &str,
        repo: &str,
        count: u32,
    ) -> Result<Vec<WorkflowRun>> {
        (**self).list_failed_runs(owner, repo, count).await
    }

    async fn get_run(&self, owner: &str, repo: &str, id: RunId) -> Result<WorkflowRun> {
        (**self).get_run(owner, repo, id).await
    }

    async fn get_log_archive(&self, owner: &str, repo: &str, id: RunId) -> Result<Vec<u8>> {
        (**self).get_log_archive(owner, repo, id).await
    }
}
