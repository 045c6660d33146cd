//! Scripted in-memory gateway for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::diff::types::{DiffMode, DiffPayload};
use crate::gateway::{BackendGateway, CreateSessionRequest, GatewayError, StartSessionRequest};
use crate::sessions::types::{BaseRepoInfo, SessionStatus, SessionSummary, TerminalKind};

/// Records every command and replies with canned data. Individual
/// commands can be scripted to fail once, and `get_diff` can be given a
/// queue of outcomes and an artificial latency (for paused-time tests).
pub(crate) struct ScriptedGateway {
    pub calls: Mutex<Vec<String>>,
    pub list_sessions_response: Mutex<Vec<SessionSummary>>,
    pub branches_response: Mutex<Vec<String>>,
    pub diff_responses: Mutex<VecDeque<Result<DiffPayload, GatewayError>>>,
    pub diff_delay: Duration,
    pub watch_start_delay: Duration,
    fail_once: Mutex<Option<String>>,
    next_id: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            list_sessions_response: Mutex::new(Vec::new()),
            branches_response: Mutex::new(vec!["main".to_string()]),
            diff_responses: Mutex::new(VecDeque::new()),
            diff_delay: Duration::ZERO,
            watch_start_delay: Duration::ZERO,
            fail_once: Mutex::new(None),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn with_diff_delay(delay: Duration) -> Self {
        Self {
            diff_delay: delay,
            ..Self::new()
        }
    }

    pub fn with_watch_start_delay(delay: Duration) -> Self {
        Self {
            watch_start_delay: delay,
            ..Self::new()
        }
    }

    /// Make the next invocation of `command` fail with `message`.
    pub fn fail_next(&self, command: &str) {
        *self.fail_once.lock().unwrap() = Some(command.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(command))
            .count()
    }

    pub fn summary(&self, id: &str, status: SessionStatus) -> SessionSummary {
        SessionSummary {
            session_id: id.to_string(),
            title: format!("Session {}", id),
            status,
            created_at: chrono::Utc::now(),
            started_at: None,
            ended_at: None,
            worktree_path: format!("/repo/.gantry/worktrees/{}", id),
            branch_name: format!("branch-{}", id),
            base_branch: "main".to_string(),
            base_repo_path: "/repo".to_string(),
            base_commit: "headsha".to_string(),
            exit_code: None,
        }
    }

    fn record(&self, call: String, command: &str) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        let mut fail = self.fail_once.lock().unwrap();
        if fail.as_deref() == Some(command) {
            *fail = None;
            return Err(GatewayError::command(format!("{} failed", command)));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    async fn select_base_repository(&self, path: &str) -> Result<BaseRepoInfo, GatewayError> {
        self.record(
            format!("select_base_repository {}", path),
            "select_base_repository",
        )?;
        Ok(BaseRepoInfo {
            path: path.to_string(),
            canonical_path: path.to_string(),
            current_branch: "main".to_string(),
            head: "headsha".to_string(),
        })
    }

    async fn list_sessions(&self, repo_path: &str) -> Result<Vec<SessionSummary>, GatewayError> {
        self.record(format!("list_sessions {}", repo_path), "list_sessions")?;
        Ok(self.list_sessions_response.lock().unwrap().clone())
    }

    async fn list_branches(&self, repo_path: &str) -> Result<Vec<String>, GatewayError> {
        self.record(format!("list_branches {}", repo_path), "list_branches")?;
        Ok(self.branches_response.lock().unwrap().clone())
    }

    async fn create_session(
        &self,
        req: CreateSessionRequest,
    ) -> Result<SessionSummary, GatewayError> {
        self.record(
            format!("create_session {}", req.branch_name),
            "create_session",
        )?;
        let id = format!("sess-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut summary = self.summary(&id, SessionStatus::CreatingWorktree);
        summary.title = req
            .title
            .unwrap_or_else(|| crate::title::title_from_branch(&req.branch_name));
        summary.branch_name = req.branch_name;
        summary.base_branch = req.base_ref;
        summary.base_repo_path = req.repo_path;
        Ok(summary)
    }

    async fn start_session(
        &self,
        req: StartSessionRequest,
    ) -> Result<SessionSummary, GatewayError> {
        self.record(format!("start_session {}", req.session_id), "start_session")?;
        Ok(self.summary(&req.session_id, SessionStatus::Working))
    }

    async fn stop_session(&self, session_id: &str) -> Result<SessionSummary, GatewayError> {
        self.record(format!("stop_session {}", session_id), "stop_session")?;
        Ok(self.summary(session_id, SessionStatus::Stopped))
    }

    async fn discard_session(&self, session_id: &str) -> Result<(), GatewayError> {
        self.record(format!("discard_session {}", session_id), "discard_session")
    }

    async fn write_terminal(
        &self,
        session_id: &str,
        kind: TerminalKind,
        data: &str,
    ) -> Result<(), GatewayError> {
        self.record(
            format!("write_terminal {} {:?} {}", session_id, kind, data),
            "write_terminal",
        )
    }

    async fn resize_terminal(
        &self,
        session_id: &str,
        kind: TerminalKind,
        cols: u16,
        rows: u16,
    ) -> Result<(), GatewayError> {
        self.record(
            format!("resize_terminal {} {:?} {}x{}", session_id, kind, cols, rows),
            "resize_terminal",
        )
    }

    async fn start_worktree_terminal(
        &self,
        session_id: &str,
        _cols: Option<u16>,
        _rows: Option<u16>,
    ) -> Result<(), GatewayError> {
        self.record(
            format!("start_worktree_terminal {}", session_id),
            "start_worktree_terminal",
        )
    }

    async fn get_diff(
        &self,
        session_id: &str,
        _ignore_whitespace: bool,
        mode: DiffMode,
    ) -> Result<DiffPayload, GatewayError> {
        self.record(format!("get_diff {} {:?}", session_id, mode), "get_diff")?;
        if !self.diff_delay.is_zero() {
            tokio::time::sleep(self.diff_delay).await;
        }
        match self.diff_responses.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(DiffPayload {
                files: Vec::new(),
                unified_diff: String::new(),
            }),
        }
    }

    async fn diff_watch_start(&self, session_id: &str) -> Result<(), GatewayError> {
        self.record(
            format!("diff_watch_start {}", session_id),
            "diff_watch_start",
        )?;
        if !self.watch_start_delay.is_zero() {
            tokio::time::sleep(self.watch_start_delay).await;
        }
        Ok(())
    }

    async fn diff_watch_stop(&self, session_id: &str) -> Result<(), GatewayError> {
        self.record(format!("diff_watch_stop {}", session_id), "diff_watch_stop")
    }

    async fn commit(
        &self,
        session_id: &str,
        message: &str,
        stage_all: bool,
    ) -> Result<(), GatewayError> {
        self.record(
            format!("commit {} {:?} stage_all={}", session_id, message, stage_all),
            "commit",
        )
    }

    async fn push(
        &self,
        session_id: &str,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> Result<(), GatewayError> {
        self.record(
            format!(
                "push {} {} {} set_upstream={}",
                session_id, remote, branch, set_upstream
            ),
            "push",
        )
    }

    async fn open_in_editor(&self, path: &str) -> Result<(), GatewayError> {
        self.record(format!("open_in_editor {}", path), "open_in_editor")
    }

    async fn open_in_terminal(&self, path: &str) -> Result<(), GatewayError> {
        self.record(format!("open_in_terminal {}", path), "open_in_terminal")
    }

    async fn open_in_explorer(&self, path: &str) -> Result<(), GatewayError> {
        self.record(format!("open_in_explorer {}", path), "open_in_explorer")
    }
}
