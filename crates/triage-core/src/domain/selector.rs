//! Which failed run a triage request targets.

use std::str::FromStr;

use actions_client::RunId;
use serde::{Deserialize, Serialize};

use super::error::TriageError;

/// Deepest position reachable with [`RunSelector::NthRecent`].
pub const MAX_RECENT_INDEX: u32 = 10;

/// Target run of a triage request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RunSelector {
    /// Most recent failed run.
    #[default]
    Latest,

    /// N-th most recent failed run, 1-based, clamped into `[1, MAX_RECENT_INDEX]`.
    NthRecent(u32),

    /// A specific run, regardless of its position in the listing.
    ById(RunId),
}

impl RunSelector {
    /// Build an `NthRecent` selector, clamping `n` into range.
    pub fn nth_recent(n: u64) -> Self {
        RunSelector::NthRecent(clamp_index(n))
    }

    /// Size of the failure listing this selector needs, or `None` for `ById`.
    pub fn listing_size(&self) -> Option<u32> {
        match self {
            RunSelector::Latest => Some(1),
            RunSelector::NthRecent(n) => Some(clamp_index(u64::from(*n))),
            RunSelector::ById(_) => None,
        }
    }
}

fn clamp_index(n: u64) -> u32 {
    // Bounded by MAX_RECENT_INDEX, so the cast cannot truncate.
    n.clamp(1, u64::from(MAX_RECENT_INDEX)) as u32
}

impl std::fmt::Display for RunSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunSelector::Latest => write!(f, "latest"),
            RunSelector::NthRecent(n) => write!(f, "#{}", n),
            RunSelector::ById(id) => write!(f, "id {}", id),
        }
    }
}

/// Parses the user-facing selector forms: empty or `latest`, `<n>`, `id <run id>`.
///
/// The bare-number and `id` forms are mutually exclusive; input mixing them is rejected.
impl FromStr for RunSelector {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Ok(RunSelector::Latest),
            [word] if word.eq_ignore_ascii_case("latest") => Ok(RunSelector::Latest),
            [n] => n
                .parse::<u64>()
                .map(RunSelector::nth_recent)
                .map_err(|_| invalid(s, "expected a run position such as `2`")),
            [keyword, id] if keyword.eq_ignore_ascii_case("id") => id
                .parse::<u64>()
                .map(|id| RunSelector::ById(RunId(id)))
                .map_err(|_| invalid(s, "expected a numeric run id after `id`")),
            _ => Err(invalid(s, "use `<n>` or `id <run id>`, not both")),
        }
    }
}

fn invalid(input: &str, hint: &str) -> TriageError {
    TriageError::InvalidSelector(format!("`{}`: {}", input.trim(), hint))
}
