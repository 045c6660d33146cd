//! The backend's push event surface.
//!
//! Events arrive asynchronously and unordered across sessions; per
//! (session, kind) terminal output order is preserved by the backend and
//! must be preserved here. All ingestion goes through
//! [`crate::sessions::registry::SessionRegistry::handle_event`], which
//! routes by session id and silently drops events for unknown sessions
//! (discard and in-flight events legitimately race).

use serde::{Deserialize, Serialize};

use crate::sessions::types::{SessionSummary, TerminalKind};

/// A push event from the backend, tagged with its wire event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum BackendEvent {
    /// Full authoritative summary; replaces the prior record for that id.
    SessionStatusChanged(SessionSummary),

    /// Raw output chunk, appended verbatim including control sequences.
    #[serde(rename_all = "camelCase")]
    SessionTerminalOutput {
        session_id: String,
        data: String,
        kind: TerminalKind,
    },

    /// Informational only in this layer.
    #[serde(rename_all = "camelCase")]
    SessionTerminalExit {
        session_id: String,
        exit_code: i32,
        kind: TerminalKind,
    },

    /// Signal only; the payload must be re-fetched.
    #[serde(rename_all = "camelCase")]
    SessionDiffChanged { session_id: String },
}

impl BackendEvent {
    /// The session this event belongs to, for routing.
    pub fn session_id(&self) -> &str {
        match self {
            BackendEvent::SessionStatusChanged(summary) => &summary.session_id,
            BackendEvent::SessionTerminalOutput { session_id, .. } => session_id,
            BackendEvent::SessionTerminalExit { session_id, .. } => session_id,
            BackendEvent::SessionDiffChanged { session_id } => session_id,
        }
    }
}
