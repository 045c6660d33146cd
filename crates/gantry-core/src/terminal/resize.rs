use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::gateway::BackendGateway;
use crate::sessions::types::TerminalKind;

/// Debounced forwarding of viewport sizes to the backend for one
/// (session, kind) terminal.
///
/// Continuous drag-resizing fires size updates far faster than the
/// backend needs them. Each request restarts the quiet window; when it
/// elapses, the most recent size — and only that one — is sent. A
/// pending size can be flushed immediately on detach/teardown, or
/// cancelled outright.
///
/// Send failures are logged, not propagated: no synchronous caller is
/// waiting on this background path.
#[derive(Clone)]
pub struct ResizeCoalescer {
    inner: Arc<ResizeInner>,
}

struct ResizeInner {
    session_id: String,
    kind: TerminalKind,
    window: Duration,
    gateway: Arc<dyn BackendGateway>,
    state: Mutex<ResizeState>,
}

#[derive(Default)]
struct ResizeState {
    /// Most recent requested size; later requests overwrite earlier ones.
    latest: Option<(u16, u16)>,
    /// Bumped on every request/flush/cancel; a sleeping timer task whose
    /// generation no longer matches is stale and does nothing.
    generation: u64,
}

impl ResizeCoalescer {
    pub fn new(
        session_id: String,
        kind: TerminalKind,
        window: Duration,
        gateway: Arc<dyn BackendGateway>,
    ) -> Self {
        Self {
            inner: Arc::new(ResizeInner {
                session_id,
                kind,
                window,
                gateway,
                state: Mutex::new(ResizeState::default()),
            }),
        }
    }

    /// Record a new viewport size and restart the quiet window.
    pub fn request(&self, cols: u16, rows: u16) {
        let generation = {
            let mut state = self.inner.lock_state();
            state.latest = Some((cols, rows));
            state.generation += 1;
            state.generation
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.window).await;
            let size = {
                let mut state = inner.lock_state();
                if state.generation != generation {
                    return;
                }
                state.latest.take()
            };
            if let Some((cols, rows)) = size {
                inner.send(cols, rows).await;
            }
        });
    }

    /// Send any pending size immediately (used when the terminal view
    /// detaches or the session is destroyed) and cancel the timer.
    pub async fn flush(&self) {
        let size = {
            let mut state = self.inner.lock_state();
            state.generation += 1;
            state.latest.take()
        };
        if let Some((cols, rows)) = size {
            self.inner.send(cols, rows).await;
        }
    }

    /// Drop any pending size without sending it.
    pub fn cancel(&self) {
        let mut state = self.inner.lock_state();
        state.generation += 1;
        state.latest = None;
    }

    pub fn has_pending(&self) -> bool {
        self.inner.lock_state().latest.is_some()
    }
}

impl ResizeInner {
    async fn send(&self, cols: u16, rows: u16) {
        debug!(
            event = "terminal.resize.sent",
            session_id = %self.session_id,
            kind = ?self.kind,
            cols = cols,
            rows = rows,
        );
        if let Err(e) = self
            .gateway
            .resize_terminal(&self.session_id, self.kind, cols, rows)
            .await
        {
            warn!(
                event = "terminal.resize.send_failed",
                session_id = %self.session_id,
                kind = ?self.kind,
                error = %e,
            );
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ResizeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
