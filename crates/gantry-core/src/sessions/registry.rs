use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::config::GantryConfig;
use crate::diff::types::{DiffMode, DiffSnapshot};
use crate::diff::watcher::DiffWatcher;
use crate::events::BackendEvent;
use crate::gateway::{BackendGateway, CreateSessionRequest, StartSessionRequest};
use crate::sessions::errors::SessionError;
use crate::sessions::types::{BaseRepoInfo, SessionSummary, TerminalKind};
use crate::terminal::mux::TerminalMux;
use crate::terminal::resize::ResizeCoalescer;

/// The aggregate that owns the authoritative session list, the selection
/// cursor, and every per-session terminal and diff component.
///
/// Sessions are scoped to one base repository at a time; selecting a new
/// repository destroys all in-memory session state. The registry never
/// computes status transitions itself: mutating commands and status
/// events carry the backend's authoritative snapshot, and the local
/// record for that ID is replaced wholesale. Events for unknown or
/// already-discarded sessions are dropped silently, since discard and
/// in-flight events can legitimately race.
///
/// All shared state sits behind one mutex that is never held across an
/// await; event ingestion is fully synchronous, which is what preserves
/// per-channel output ordering.
pub struct SessionRegistry {
    gateway: Arc<dyn BackendGateway>,
    mux: Arc<TerminalMux>,
    resize_window: Duration,
    diff_debounce: Duration,
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    base_repo: Option<BaseRepoInfo>,
    branches: Vec<String>,
    /// Ordered by creation timestamp for stable list presentation.
    sessions: Vec<SessionSummary>,
    selected: Option<String>,
    watchers: HashMap<String, DiffWatcher>,
    resizers: HashMap<(String, TerminalKind), ResizeCoalescer>,
}

impl SessionRegistry {
    pub fn new(gateway: Arc<dyn BackendGateway>, config: &GantryConfig) -> Self {
        Self {
            gateway,
            mux: Arc::new(TerminalMux::new(
                config.terminal.scrollback_lines,
                config.terminal.broadcast_capacity,
            )),
            resize_window: Duration::from_millis(config.terminal.resize_debounce_ms),
            diff_debounce: Duration::from_millis(config.diff.debounce_ms),
            state: Mutex::new(RegistryState::default()),
        }
    }

    // --- repository context ---------------------------------------------

    /// Switch the active base repository.
    ///
    /// Destroys all in-memory session state from the previous repository
    /// (session list, selection, terminal buffers and subscriptions, diff
    /// watchers, pending resizes), then reloads the session and branch
    /// lists from the backend.
    pub async fn select_base_repository(&self, path: &str) -> Result<BaseRepoInfo, SessionError> {
        let repo = self.gateway.select_base_repository(path).await?;

        let (watchers, resizers) = {
            let mut state = self.lock_state();
            state.sessions.clear();
            state.selected = None;
            state.branches.clear();
            state.base_repo = Some(repo.clone());
            (
                std::mem::take(&mut state.watchers),
                std::mem::take(&mut state.resizers),
            )
        };
        self.mux.remove_all();
        for resizer in resizers.values() {
            resizer.cancel();
        }
        for watcher in watchers.values() {
            watcher.stop().await;
        }

        let sessions = self.gateway.list_sessions(&repo.path).await?;
        let branches = self.gateway.list_branches(&repo.path).await?;
        {
            let mut state = self.lock_state();
            let mut sessions = sessions;
            sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            state.sessions = sessions;
            state.branches = branches;
        }

        info!(
            event = "sessions.repository.selected",
            path = %repo.path,
            branch = %repo.current_branch,
        );
        Ok(repo)
    }

    pub fn base_repository(&self) -> Option<BaseRepoInfo> {
        self.lock_state().base_repo.clone()
    }

    pub fn branches(&self) -> Vec<String> {
        self.lock_state().branches.clone()
    }

    // --- session lifecycle ----------------------------------------------

    /// Snapshot of the session list, in creation order.
    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.lock_state().sessions.clone()
    }

    pub fn session(&self, session_id: &str) -> Option<SessionSummary> {
        self.lock_state()
            .sessions
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned()
    }

    pub fn selected_session_id(&self) -> Option<String> {
        self.lock_state().selected.clone()
    }

    pub fn select_session(&self, session_id: &str) -> Result<(), SessionError> {
        let mut state = self.lock_state();
        if !state.sessions.iter().any(|s| s.session_id == session_id) {
            return Err(SessionError::UnknownSession {
                session_id: session_id.to_string(),
            });
        }
        state.selected = Some(session_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&self) {
        self.lock_state().selected = None;
    }

    /// Create a new session on `branch_name` off `base_ref`.
    ///
    /// Requires an active base repository. The backend's returned
    /// snapshot is inserted in creation order; the new session is
    /// auto-selected when nothing else is.
    pub async fn create_session(
        &self,
        branch_name: &str,
        title: Option<String>,
        base_ref: &str,
    ) -> Result<SessionSummary, SessionError> {
        let repo_path = {
            let state = self.lock_state();
            state
                .base_repo
                .as_ref()
                .map(|r| r.path.clone())
                .ok_or(SessionError::NoBaseRepository)?
        };

        let summary = self
            .gateway
            .create_session(CreateSessionRequest {
                repo_path,
                base_ref: base_ref.to_string(),
                title,
                branch_name: branch_name.to_string(),
            })
            .await?;

        {
            let mut state = self.lock_state();
            state.upsert(summary.clone());
            if state.selected.is_none() {
                state.selected = Some(summary.session_id.clone());
            }
        }
        info!(
            event = "sessions.create.completed",
            session_id = %summary.session_id,
            branch = %summary.branch_name,
        );
        Ok(summary)
    }

    pub async fn start_session(
        &self,
        session_id: &str,
        cols: Option<u16>,
        rows: Option<u16>,
        agent: Option<String>,
    ) -> Result<SessionSummary, SessionError> {
        let summary = self
            .gateway
            .start_session(StartSessionRequest {
                session_id: session_id.to_string(),
                cols,
                rows,
                agent,
            })
            .await?;
        self.lock_state().upsert(summary.clone());
        info!(
            event = "sessions.start.completed",
            session_id = %summary.session_id,
            status = ?summary.status,
        );
        Ok(summary)
    }

    pub async fn stop_session(&self, session_id: &str) -> Result<SessionSummary, SessionError> {
        let summary = self.gateway.stop_session(session_id).await?;
        self.lock_state().upsert(summary.clone());
        info!(
            event = "sessions.stop.completed",
            session_id = %summary.session_id,
            status = ?summary.status,
        );
        Ok(summary)
    }

    /// Discard a session and free everything it owns: its record, both
    /// terminal channels, its diff watcher, and any pending resize.
    pub async fn discard_session(&self, session_id: &str) -> Result<(), SessionError> {
        // Any coalesced resize still pending is moot once the session is
        // gone; deliver it while the terminal still exists.
        let pending: Vec<ResizeCoalescer> = {
            let state = self.lock_state();
            state
                .resizers
                .iter()
                .filter(|((id, _), _)| id == session_id)
                .map(|(_, r)| r.clone())
                .collect()
        };
        for resizer in &pending {
            resizer.flush().await;
        }

        self.gateway.discard_session(session_id).await?;

        let watcher = {
            let mut state = self.lock_state();
            state.sessions.retain(|s| s.session_id != session_id);
            if state.selected.as_deref() == Some(session_id) {
                state.selected = None;
            }
            state
                .resizers
                .retain(|(id, _), _| id != session_id);
            state.watchers.remove(session_id)
        };
        self.mux.remove(session_id);
        if let Some(watcher) = watcher {
            watcher.stop().await;
        }

        info!(event = "sessions.discard.completed", session_id = %session_id);
        Ok(())
    }

    // --- terminals ------------------------------------------------------

    /// Attach to a terminal channel: the scrollback snapshot as of this
    /// instant plus a live receiver for everything after it, atomically.
    pub fn attach_terminal(
        &self,
        session_id: &str,
        kind: TerminalKind,
    ) -> (String, broadcast::Receiver<String>) {
        self.mux.snapshot_and_subscribe(session_id, kind)
    }

    pub fn terminal_buffer(&self, session_id: &str, kind: TerminalKind) -> String {
        self.mux.snapshot(session_id, kind)
    }

    pub fn clear_terminal(&self, session_id: &str, kind: TerminalKind) {
        self.mux.clear(session_id, kind);
    }

    pub async fn write_terminal(
        &self,
        session_id: &str,
        kind: TerminalKind,
        data: &str,
    ) -> Result<(), SessionError> {
        self.gateway.write_terminal(session_id, kind, data).await?;
        Ok(())
    }

    /// Record a viewport size; the send to the backend is debounced so
    /// drag-resizing does not flood it. The most recent size wins.
    pub fn resize_terminal(&self, session_id: &str, kind: TerminalKind, cols: u16, rows: u16) {
        let resizer = {
            let mut state = self.lock_state();
            state
                .resizers
                .entry((session_id.to_string(), kind))
                .or_insert_with(|| {
                    ResizeCoalescer::new(
                        session_id.to_string(),
                        kind,
                        self.resize_window,
                        Arc::clone(&self.gateway),
                    )
                })
                .clone()
        };
        resizer.request(cols, rows);
    }

    /// Flush any pending coalesced resize for a channel; called when the
    /// consuming view detaches from the terminal.
    pub async fn detach_terminal(&self, session_id: &str, kind: TerminalKind) {
        let resizer = {
            let state = self.lock_state();
            state
                .resizers
                .get(&(session_id.to_string(), kind))
                .cloned()
        };
        if let Some(resizer) = resizer {
            resizer.flush().await;
        }
    }

    pub async fn start_worktree_terminal(
        &self,
        session_id: &str,
        cols: Option<u16>,
        rows: Option<u16>,
    ) -> Result<(), SessionError> {
        self.gateway
            .start_worktree_terminal(session_id, cols, rows)
            .await?;
        Ok(())
    }

    // --- diff -----------------------------------------------------------

    /// Begin observing a session's diff under `mode`.
    ///
    /// At most one watcher is active per session; asking for a different
    /// mode tears the old one down and starts fresh. Asking for the same
    /// mode again just returns another receiver on the live watcher.
    pub async fn watch_diff(
        &self,
        session_id: &str,
        mode: DiffMode,
        ignore_whitespace: bool,
    ) -> watch::Receiver<DiffSnapshot> {
        // The watcher must be in the map before start() is awaited: the
        // backend may emit a diff-changed event the moment the watch is
        // registered, and handle_event must find someone to route it to.
        let (watcher, stale) = {
            let mut state = self.lock_state();
            if let Some(w) = state.watchers.get(session_id)
                && w.mode() == mode
            {
                return w.subscribe();
            }
            let stale = state.watchers.remove(session_id);
            let watcher = DiffWatcher::new(
                session_id.to_string(),
                mode,
                ignore_whitespace,
                self.diff_debounce,
                Arc::clone(&self.gateway),
            );
            state
                .watchers
                .insert(session_id.to_string(), watcher.clone());
            (watcher, stale)
        };
        if let Some(stale) = stale {
            stale.stop().await;
        }

        let rx = watcher.subscribe();
        watcher.start().await;
        rx
    }

    /// Stop observing a session's diff. Safe to call when no watch is
    /// active.
    pub async fn stop_diff_watch(&self, session_id: &str) {
        let watcher = self.lock_state().watchers.remove(session_id);
        if let Some(watcher) = watcher {
            watcher.stop().await;
        }
    }

    // --- git and host passthroughs --------------------------------------

    pub async fn commit(
        &self,
        session_id: &str,
        message: &str,
        stage_all: bool,
    ) -> Result<(), SessionError> {
        self.gateway.commit(session_id, message, stage_all).await?;
        info!(event = "sessions.commit.completed", session_id = %session_id);
        Ok(())
    }

    pub async fn push(
        &self,
        session_id: &str,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), SessionError> {
        self.gateway
            .push(session_id, remote, branch, set_upstream)
            .await?;
        info!(event = "sessions.push.completed", session_id = %session_id);
        Ok(())
    }

    pub async fn open_in_editor(&self, path: &str) -> Result<(), SessionError> {
        Ok(self.gateway.open_in_editor(path).await?)
    }

    pub async fn open_in_terminal(&self, path: &str) -> Result<(), SessionError> {
        Ok(self.gateway.open_in_terminal(path).await?)
    }

    pub async fn open_in_explorer(&self, path: &str) -> Result<(), SessionError> {
        Ok(self.gateway.open_in_explorer(path).await?)
    }

    // --- event ingestion ------------------------------------------------

    /// Route one backend push event to the component that owns it.
    ///
    /// Synchronous on purpose: callers deliver events for a session in
    /// the order the backend emitted them, and nothing here suspends, so
    /// that order reaches the multiplexer intact. Events for sessions
    /// this registry does not know are dropped without effect.
    pub fn handle_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::SessionStatusChanged(summary) => {
                debug!(
                    event = "sessions.event.status",
                    session_id = %summary.session_id,
                    status = ?summary.status,
                );
                self.lock_state().upsert(summary);
            }
            BackendEvent::SessionTerminalOutput {
                session_id,
                data,
                kind,
            } => {
                if !self.knows(&session_id) {
                    return;
                }
                self.mux.write(&session_id, kind, &data);
            }
            BackendEvent::SessionTerminalExit {
                session_id,
                exit_code,
                kind,
            } => {
                // Informational only; status events carry the outcome.
                debug!(
                    event = "sessions.event.terminal_exit",
                    session_id = %session_id,
                    kind = ?kind,
                    exit_code = exit_code,
                );
            }
            BackendEvent::SessionDiffChanged { session_id } => {
                let watcher = self.lock_state().watchers.get(&session_id).cloned();
                if let Some(watcher) = watcher {
                    watcher.notify_changed();
                }
            }
        }
    }

    fn knows(&self, session_id: &str) -> bool {
        self.lock_state()
            .sessions
            .iter()
            .any(|s| s.session_id == session_id)
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RegistryState {
    /// Replace the record for this ID with the backend's snapshot, or
    /// insert it in creation-timestamp order when it is new.
    fn upsert(&mut self, summary: SessionSummary) {
        if let Some(existing) = self
            .sessions
            .iter_mut()
            .find(|s| s.session_id == summary.session_id)
        {
            *existing = summary;
            return;
        }
        let pos = self
            .sessions
            .iter()
            .position(|s| s.created_at > summary.created_at)
            .unwrap_or(self.sessions.len());
        self.sessions.insert(pos, summary);
    }
}
