//! Default implementations for configuration types.
//!
//! This module contains all `Default` implementations and helper functions
//! for providing default values in serde deserialization.

use crate::config::types::{DiffConfig, TerminalConfig};

/// Returns the default scrollback line cap (10,000 lines).
///
/// Bounds per-terminal memory while keeping enough history for replay
/// when a view re-attaches to a long-running session.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_scrollback_lines() -> usize {
    10_000
}

/// Returns the default broadcast channel capacity (64 chunks).
///
/// A slow subscriber that lags more than this many chunks behind loses
/// the oldest ones; it can recover by re-reading the scrollback snapshot.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_broadcast_capacity() -> usize {
    64
}

/// Returns the default resize debounce window in milliseconds (150ms).
///
/// Continuous drag-resizing fires viewport updates far faster than the
/// backend needs them; only the size observed after this quiet window
/// is forwarded.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_resize_debounce_ms() -> u64 {
    150
}

/// Returns the default fit attempt cap (30 frames).
///
/// A surface that still measures zero-sized after this many frames is
/// assumed permanently hidden and the fit request is dropped silently.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_fit_max_attempts() -> u32 {
    30
}

/// Returns the default diff refetch debounce in milliseconds (2000ms).
///
/// Absorbs bursts of filesystem change notifications into one refetch.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_diff_debounce_ms() -> u64 {
    2000
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: default_scrollback_lines(),
            broadcast_capacity: default_broadcast_capacity(),
            resize_debounce_ms: default_resize_debounce_ms(),
            fit_max_attempts: default_fit_max_attempts(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_diff_debounce_ms(),
        }
    }
}
