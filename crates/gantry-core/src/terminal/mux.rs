use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::debug;

use crate::sessions::types::TerminalKind;
use crate::terminal::buffer::LineBuffer;

/// Control sequence pushed to live subscribers when a channel is cleared,
/// so attached views reset their visual state without re-subscribing.
pub const TERMINAL_RESET: &str = "\u{1b}c";

struct Channel {
    buffer: LineBuffer,
    tx: broadcast::Sender<String>,
}

/// Fan-out point for all terminal output, keyed by (session id, kind).
///
/// Every channel pairs a line-bounded scrollback buffer with a broadcast
/// sender. The single mutex over the channel map is what makes
/// "read current snapshot, then subscribe" atomic with respect to
/// concurrent writes: [`TerminalMux::snapshot_and_subscribe`] performs
/// both under one lock, so no write can land between them.
///
/// All operations are infallible and purely in-process. No backpressure
/// is applied upstream; the bounded buffer (and the broadcast channel's
/// lag semantics for slow subscribers) are the sole mitigations against
/// unbounded growth.
pub struct TerminalMux {
    channels: Mutex<HashMap<(String, TerminalKind), Channel>>,
    scrollback_lines: usize,
    broadcast_capacity: usize,
}

impl TerminalMux {
    pub fn new(scrollback_lines: usize, broadcast_capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            // Both caps must be non-zero for the underlying primitives.
            scrollback_lines: scrollback_lines.max(1),
            broadcast_capacity: broadcast_capacity.max(1),
        }
    }

    /// Append a chunk to the channel's buffer and publish it to all
    /// current subscribers, in write order. Channels are created lazily.
    pub fn write(&self, session_id: &str, kind: TerminalKind, chunk: &str) {
        let mut channels = self.lock_channels();
        let channel = self.entry(&mut channels, session_id, kind);
        channel.buffer.push_chunk(chunk);
        if channel.tx.send(chunk.to_string()).is_err() {
            debug!(
                event = "terminal.mux.no_subscribers",
                session_id = session_id,
                kind = ?kind,
                "No subscribers attached, chunk buffered only"
            );
        }
    }

    /// Current buffer contents (snapshot, not a live view). Empty string
    /// for a channel that has never been written.
    pub fn snapshot(&self, session_id: &str, kind: TerminalKind) -> String {
        let channels = self.lock_channels();
        channels
            .get(&(session_id.to_string(), kind))
            .map(|c| c.buffer.contents())
            .unwrap_or_default()
    }

    /// Atomically read the current buffer and subscribe to live output.
    ///
    /// The returned receiver sees every chunk written after this call and
    /// none written before it; the snapshot covers everything earlier.
    /// No gap, no duplication.
    pub fn snapshot_and_subscribe(
        &self,
        session_id: &str,
        kind: TerminalKind,
    ) -> (String, broadcast::Receiver<String>) {
        let mut channels = self.lock_channels();
        let channel = self.entry(&mut channels, session_id, kind);
        (channel.buffer.contents(), channel.tx.subscribe())
    }

    /// Reset the buffer to empty and push a terminal-reset sequence to
    /// live subscribers, preserving their subscriptions.
    pub fn clear(&self, session_id: &str, kind: TerminalKind) {
        let mut channels = self.lock_channels();
        if let Some(channel) = channels.get_mut(&(session_id.to_string(), kind)) {
            channel.buffer.clear();
            let _ = channel.tx.send(TERMINAL_RESET.to_string());
        }
    }

    /// Drop all buffers and subscriptions for both kinds of a session.
    /// Invoked on session discard; frees memory deterministically.
    pub fn remove(&self, session_id: &str) {
        let mut channels = self.lock_channels();
        let before = channels.len();
        channels.retain(|(id, _), _| id != session_id);
        if channels.len() != before {
            debug!(
                event = "terminal.mux.channels_removed",
                session_id = session_id,
                removed = before - channels.len(),
            );
        }
    }

    /// Drop every channel (base repository switch).
    pub fn remove_all(&self) {
        let mut channels = self.lock_channels();
        let removed = channels.len();
        channels.clear();
        if removed > 0 {
            debug!(event = "terminal.mux.all_channels_removed", removed = removed);
        }
    }

    /// Number of live channels (session, kind pairs).
    pub fn channel_count(&self) -> usize {
        self.lock_channels().len()
    }

    /// Number of subscribers currently attached to one channel.
    pub fn subscriber_count(&self, session_id: &str, kind: TerminalKind) -> usize {
        let channels = self.lock_channels();
        channels
            .get(&(session_id.to_string(), kind))
            .map(|c| c.tx.receiver_count())
            .unwrap_or(0)
    }

    fn entry<'a>(
        &self,
        channels: &'a mut HashMap<(String, TerminalKind), Channel>,
        session_id: &str,
        kind: TerminalKind,
    ) -> &'a mut Channel {
        channels
            .entry((session_id.to_string(), kind))
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.broadcast_capacity);
                Channel {
                    buffer: LineBuffer::new(self.scrollback_lines),
                    tx,
                }
            })
    }

    /// A poisoned map only means a panic happened mid-operation on
    /// in-process state; the data is still structurally sound.
    fn lock_channels(&self) -> MutexGuard<'_, HashMap<(String, TerminalKind), Channel>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }
}
