//! In-memory fake of the Actions API (testing only)
//!
//! `FakeActionsApi` holds canned runs and archives, honours the same
//! newest-first / `count` contract as the real client, and records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::ActionsApi;
use crate::error::ClientError;
use crate::run::{RunId, RunStatus, WorkflowRun};
use crate::Result;

/// One recorded call against the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListFailedRuns {
        owner: String,
        repo: String,
        count: u32,
    },
    GetRun {
        owner: String,
        repo: String,
        id: RunId,
    },
    GetLogArchive {
        owner: String,
        repo: String,
        id: RunId,
    },
}

/// Canned Actions API backed by in-memory runs and archives.
#[derive(Debug, Default)]
pub struct FakeActionsApi {
    runs: Vec<WorkflowRun>,
    archives: HashMap<RunId, Vec<u8>>,
    failure: Option<ClientError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeActionsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a run to the fake's history.
    pub fn with_run(mut self, run: WorkflowRun) -> Self {
        self.runs.push(run);
        self
    }

    /// Attach the zip bytes returned for a run's logs.
    pub fn with_archive(mut self, id: RunId, bytes: Vec<u8>) -> Self {
        self.archives.insert(id, bytes);
        self
    }

    /// Make every call fail with `error`.
    pub fn failing_with(mut self, error: ClientError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ActionsApi for FakeActionsApi {
    async fn list_failed_runs(
        &self,
        owner: &str,
        repo: &str,
        count: u32,
    ) -> Result<Vec<WorkflowRun>> {
        self.record(RecordedCall::ListFailedRuns {
            owner: owner.to_string(),
            repo: repo.to_string(),
            count,
        })?;

        let mut failed: Vec<WorkflowRun> = self
            .runs
            .iter()
            .filter(|r| r.status == RunStatus::Failure)
            .cloned()
            .collect();
        failed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        failed.truncate(count as usize);
        Ok(failed)
    }

    async fn get_run(&self, owner: &str, repo: &str, id: RunId) -> Result<WorkflowRun> {
        self.record(RecordedCall::GetRun {
            owner: owner.to_string(),
            repo: repo.to_string(),
            id,
        })?;

        self.runs
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ClientError::transport(Some(404), r#"{"message":"Not Found"}"#))
    }

    async fn get_log_archive(&self, owner: &str, repo: &str, id: RunId) -> Result<Vec<u8>> {
        self.record(RecordedCall::GetLogArchive {
            owner: owner.to_string(),
            repo: repo.to_string(),
            id,
        })?;

        self.archives
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::transport(Some(410), "logs have expired"))
    }
}
