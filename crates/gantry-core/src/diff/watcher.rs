use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::diff::types::{DiffMode, DiffSnapshot};
use crate::gateway::BackendGateway;

/// Live, auto-refreshing view of one session's diff under one mode.
///
/// At most one watcher is active per session; switching mode tears the
/// old one down and creates a new one. The watcher keeps a single
/// authoritative snapshot fresh in the presence of bursty change
/// notifications while guaranteeing:
///
/// - at most one fetch in flight at a time;
/// - a change notification arriving mid-fetch is coalesced into exactly
///   one follow-up fetch, never dropped, never parallel;
/// - change bursts are absorbed by a last-event-wins debounce window;
/// - a failed fetch preserves the last-known-good payload and sets an
///   error alongside it;
/// - teardown is idempotent and clears every timer and flag.
///
/// Every transition publishes a full immutable [`DiffSnapshot`] through a
/// `tokio::sync::watch` channel; observers never see partial updates.
#[derive(Clone)]
pub struct DiffWatcher {
    inner: Arc<WatcherInner>,
}

struct WatcherInner {
    session_id: String,
    mode: DiffMode,
    ignore_whitespace: bool,
    debounce: Duration,
    gateway: Arc<dyn BackendGateway>,
    state: Mutex<WatchState>,
    snapshot_tx: watch::Sender<DiffSnapshot>,
}

#[derive(Default)]
struct WatchState {
    started: bool,
    stopped: bool,
    /// A fetch task is currently running.
    fetch_in_flight: bool,
    /// A refresh arrived while a fetch was in flight; run exactly one
    /// more when it completes.
    refresh_queued: bool,
    /// Bumped on every change event (and on stop); a sleeping debounce
    /// task whose generation no longer matches is stale.
    debounce_generation: u64,
}

impl DiffWatcher {
    pub fn new(
        session_id: String,
        mode: DiffMode,
        ignore_whitespace: bool,
        debounce: Duration,
        gateway: Arc<dyn BackendGateway>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(DiffSnapshot::default());
        Self {
            inner: Arc::new(WatcherInner {
                session_id,
                mode,
                ignore_whitespace,
                debounce,
                gateway,
                state: Mutex::new(WatchState::default()),
                snapshot_tx,
            }),
        }
    }

    pub fn mode(&self) -> DiffMode {
        self.inner.mode
    }

    /// Observe the snapshot stream. The receiver immediately holds the
    /// current snapshot and is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<DiffSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Begin watching: fetch immediately, then ask the backend to start
    /// emitting change events for this session.
    ///
    /// The watch-start call is best-effort; a failure is logged and the
    /// watcher stays usable (polling via explicit notifications still
    /// works, and `stop` remains safe).
    pub async fn start(&self) {
        {
            let mut state = self.inner.lock_state();
            if state.started || state.stopped {
                return;
            }
            state.started = true;
        }
        WatcherInner::request_fetch(&self.inner);

        if let Err(e) = self
            .inner
            .gateway
            .diff_watch_start(&self.inner.session_id)
            .await
        {
            warn!(
                event = "diff.watch.start_failed",
                session_id = %self.inner.session_id,
                error = %e,
            );
            return;
        }

        // A concurrent stop() may have run while the registration was in
        // flight, with its backend stop call landing before our start did.
        // Undo the registration so the backend watch is not leaked.
        let stopped_meanwhile = self.inner.lock_state().stopped;
        if stopped_meanwhile
            && let Err(e) = self
                .inner
                .gateway
                .diff_watch_stop(&self.inner.session_id)
                .await
        {
            warn!(
                event = "diff.watch.stop_failed",
                session_id = %self.inner.session_id,
                error = %e,
            );
        }
    }

    /// Handle a diff-changed notification for this session.
    ///
    /// Restarts the debounce window (last event wins). When the window
    /// elapses, a fetch is launched — or queued, if one is in flight.
    pub fn notify_changed(&self) {
        let generation = {
            let mut state = self.inner.lock_state();
            if state.stopped {
                return;
            }
            state.debounce_generation += 1;
            state.debounce_generation
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            {
                let state = inner.lock_state();
                if state.stopped || state.debounce_generation != generation {
                    return;
                }
            }
            WatcherInner::request_fetch(&inner);
        });
    }

    /// Tear down: cancel the pending debounce timer, reset in-flight and
    /// queued flags, and ask the backend to stop emitting change events.
    ///
    /// Idempotent, and safe even if `start` partially failed. The
    /// backend stop call is best-effort: the local view is going away
    /// regardless, so failures are logged, never propagated.
    pub async fn stop(&self) {
        {
            let mut state = self.inner.lock_state();
            if state.stopped {
                return;
            }
            state.stopped = true;
            state.refresh_queued = false;
            state.debounce_generation += 1;
        }
        debug!(
            event = "diff.watch.stopped",
            session_id = %self.inner.session_id,
            mode = ?self.inner.mode,
        );

        if let Err(e) = self
            .inner
            .gateway
            .diff_watch_stop(&self.inner.session_id)
            .await
        {
            warn!(
                event = "diff.watch.stop_failed",
                session_id = %self.inner.session_id,
                error = %e,
            );
        }
    }
}

impl WatcherInner {
    /// Launch a fetch, or queue one if a fetch is already in flight.
    /// The single-flight invariant lives here: `fetch_in_flight` is
    /// checked and set under one lock before any task is spawned.
    fn request_fetch(inner: &Arc<WatcherInner>) {
        {
            let mut state = inner.lock_state();
            if state.stopped {
                return;
            }
            if state.fetch_in_flight {
                state.refresh_queued = true;
                return;
            }
            state.fetch_in_flight = true;
        }

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            loop {
                inner.publish(|snap| {
                    snap.loading = true;
                });

                let result = inner
                    .gateway
                    .get_diff(&inner.session_id, inner.ignore_whitespace, inner.mode)
                    .await;

                // The outcome is published and the in-flight flag released
                // under one lock: a follow-up fetch launched the instant the
                // flag clears can never have its loading=true publish
                // overwritten by this task's result.
                {
                    let mut state = inner.lock_state();
                    if state.stopped {
                        state.fetch_in_flight = false;
                        return;
                    }
                    let run_again = state.refresh_queued;
                    state.refresh_queued = false;

                    match result {
                        Ok(payload) => {
                            inner.publish(|snap| {
                                snap.payload = Some(payload);
                                snap.error = None;
                                snap.loading = run_again;
                                snap.has_loaded = true;
                                snap.last_updated = Some(chrono::Utc::now());
                            });
                        }
                        Err(e) => {
                            // Keep showing stale-but-valid data next to the error.
                            inner.publish(|snap| {
                                snap.error = Some(e.message().to_string());
                                snap.loading = run_again;
                            });
                        }
                    }

                    if !run_again {
                        state.fetch_in_flight = false;
                        return;
                    }
                }
            }
        });
    }

    fn publish<F: FnOnce(&mut DiffSnapshot)>(&self, update: F) {
        self.snapshot_tx.send_modify(update);
    }

    fn lock_state(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
