//! Actions-Client: GitHub Actions API access for CI triage
//!
//! This crate is the hosting-API layer of the triage workspace. It lists
//! failed workflow runs, fetches single runs and downloads log archives.
//!
//! ## Layer 0 - Hosting API
//!
//! Focus: authenticated, time-bounded requests with correctly encoded paths.
//! Everything above this layer talks to [`ActionsApi`], so it can be driven by
//! [`fakes::FakeActionsApi`] in tests.

pub mod api;
pub mod client;
pub mod error;
pub mod fakes;
pub mod run;

pub use api::ActionsApi;
pub use client::{
    ClientConfig, GitHubActionsClient, API_VERSION, DEFAULT_API_URL, DEFAULT_TIMEOUT,
};
pub use error::{truncate_body, ClientError, MAX_ERROR_BODY_CHARS};
pub use run::{RunId, RunStatus, WorkflowRun};

/// Result type for Actions API operations
pub type Result<T> = std::result::Result<T, ClientError>;
