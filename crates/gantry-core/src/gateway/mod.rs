//! The RPC boundary to the native backend.
//!
//! Every command is an asynchronous request/response round-trip. Mutating
//! session commands return a fresh authoritative `SessionSummary` or fail
//! outright; there is no partial-success state. The backend's push events
//! arrive separately (see [`crate::events`]).

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::diff::types::{DiffMode, DiffPayload};
use crate::errors::{GantryError, backend_error_message};
use crate::sessions::types::{BaseRepoInfo, SessionSummary, TerminalKind};

/// Error communicating with the backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("Backend command failed: {message}")]
    Command { message: String },
}

impl GatewayError {
    pub fn command(message: impl Into<String>) -> Self {
        GatewayError::Command {
            message: message.into(),
        }
    }

    /// Build an error from whatever shape the backend returned
    /// (string, object with a `message` field, or anything else).
    pub fn from_raw(raw: &serde_json::Value) -> Self {
        GatewayError::Command {
            message: backend_error_message(raw),
        }
    }

    /// The human-readable message, for display by the initiating UI flow.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Command { message } => message,
        }
    }
}

impl GantryError for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Command { .. } => "BACKEND_COMMAND_FAILED",
        }
    }
}

/// Parameters for the create-session command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub repo_path: String,
    pub base_ref: String,
    pub title: Option<String>,
    pub branch_name: String,
}

/// Parameters for the start-session command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub session_id: String,
    pub cols: Option<u16>,
    pub rows: Option<u16>,
    pub agent: Option<String>,
}

/// The backend command surface consumed by the core.
///
/// Implementations wrap whatever IPC the host application uses; this
/// layer only assumes asynchronous request/response semantics.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn select_base_repository(&self, path: &str) -> Result<BaseRepoInfo, GatewayError>;

    async fn list_sessions(&self, repo_path: &str) -> Result<Vec<SessionSummary>, GatewayError>;

    async fn list_branches(&self, repo_path: &str) -> Result<Vec<String>, GatewayError>;

    async fn create_session(
        &self,
        req: CreateSessionRequest,
    ) -> Result<SessionSummary, GatewayError>;

    async fn start_session(&self, req: StartSessionRequest)
    -> Result<SessionSummary, GatewayError>;

    async fn stop_session(&self, session_id: &str) -> Result<SessionSummary, GatewayError>;

    async fn discard_session(&self, session_id: &str) -> Result<(), GatewayError>;

    async fn write_terminal(
        &self,
        session_id: &str,
        kind: TerminalKind,
        data: &str,
    ) -> Result<(), GatewayError>;

    async fn resize_terminal(
        &self,
        session_id: &str,
        kind: TerminalKind,
        cols: u16,
        rows: u16,
    ) -> Result<(), GatewayError>;

    /// Spawn the secondary shell terminal in the session's working tree.
    async fn start_worktree_terminal(
        &self,
        session_id: &str,
        cols: Option<u16>,
        rows: Option<u16>,
    ) -> Result<(), GatewayError>;

    async fn get_diff(
        &self,
        session_id: &str,
        ignore_whitespace: bool,
        mode: DiffMode,
    ) -> Result<DiffPayload, GatewayError>;

    /// Ask the backend to begin emitting diff-changed events for a session.
    async fn diff_watch_start(&self, session_id: &str) -> Result<(), GatewayError>;

    /// Ask the backend to stop emitting diff-changed events for a session.
    async fn diff_watch_stop(&self, session_id: &str) -> Result<(), GatewayError>;

    async fn commit(
        &self,
        session_id: &str,
        message: &str,
        stage_all: bool,
    ) -> Result<(), GatewayError>;

    async fn push(
        &self,
        session_id: &str,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), GatewayError>;

    async fn open_in_editor(&self, path: &str) -> Result<(), GatewayError>;

    async fn open_in_terminal(&self, path: &str) -> Result<(), GatewayError>;

    async fn open_in_explorer(&self, path: &str) -> Result<(), GatewayError>;
}
