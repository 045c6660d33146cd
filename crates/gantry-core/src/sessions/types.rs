use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-reported lifecycle status of a session.
///
/// The backend owns every transition; this layer only mirrors reported
/// states and treats any transition as legal. The intended flow is
/// `CreatingWorktree → Idle → (AwaitingApproval ⇄ Working) →
/// {Completed, Failed, Stopped} → Discarded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    CreatingWorktree,
    Idle,
    AwaitingApproval,
    Working,
    Completed,
    Failed,
    Stopped,
    Discarded,
}

impl SessionStatus {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed
                | SessionStatus::Failed
                | SessionStatus::Stopped
                | SessionStatus::Discarded
        )
    }
}

/// Which of a session's two logical terminals a chunk or command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalKind {
    /// The primary agent-driven terminal.
    Agent,
    /// The secondary free-form shell into the same working tree.
    Worktree,
}

/// Authoritative snapshot of one session, as returned by the backend.
///
/// The registry holds the canonical copy; views only ever see clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub worktree_path: String,
    pub branch_name: String,
    pub base_branch: String,
    pub base_repo_path: String,
    pub base_commit: String,
    pub exit_code: Option<i32>,
}

/// The active base repository context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRepoInfo {
    pub path: String,
    pub canonical_path: String,
    pub current_branch: String,
    pub head: String,
}
