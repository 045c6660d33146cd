use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which comparison a diff watch session tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// Working tree vs. HEAD.
    #[default]
    Worktree,
    /// Working tree vs. the base branch.
    Branch,
}

/// One changed file, with the `git diff --name-status` status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    pub path: String,
    pub status: String,
}

/// The full diff for one session under one mode: the per-file status
/// list plus one combined unified-diff blob. The two are cross-referenced
/// by path, not positionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffPayload {
    pub files: Vec<DiffFile>,
    pub unified_diff: String,
}

/// Immutable view of a diff watch session, published whole on every
/// state transition. Observers never see partial updates.
///
/// `error` and `payload` are independent: a failed refresh keeps the
/// last-known-good payload and sets `error` alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffSnapshot {
    pub payload: Option<DiffPayload>,
    pub error: Option<String>,
    pub loading: bool,
    pub has_loaded: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl DiffSnapshot {
    /// A fetch is in flight while a previous payload is still shown.
    pub fn is_refreshing(&self) -> bool {
        self.loading && self.has_loaded
    }
}
