use serde::Deserialize;

use crate::config::defaults;

/// Top-level configuration for the session synchronization core.
///
/// Loaded from `~/.gantry/config.toml` when present; every field has a
/// documented default so an empty or missing file is always valid.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GantryConfig {
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub diff: DiffConfig,
}

/// Tuning for terminal buffering, resize coalescing, and fit scheduling.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TerminalConfig {
    /// Maximum retained scrollback lines per (session, kind) channel.
    /// Oldest lines are dropped first once the cap is reached.
    #[serde(default = "defaults::default_scrollback_lines")]
    pub scrollback_lines: usize,

    /// Capacity of the live-output broadcast channel per terminal.
    #[serde(default = "defaults::default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// Quiet window before a coalesced viewport resize is sent to the
    /// backend. The most recent size always wins.
    #[serde(default = "defaults::default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,

    /// How many frames the fit scheduler retries an invalid (zero-sized)
    /// measurement before giving up silently.
    #[serde(default = "defaults::default_fit_max_attempts")]
    pub fit_max_attempts: u32,
}

/// Tuning for diff watch sessions.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DiffConfig {
    /// Quiet window after a diff-changed notification before refetching.
    /// Bursts of filesystem events collapse into a single refetch.
    #[serde(default = "defaults::default_diff_debounce_ms")]
    pub debounce_ms: u64,
}
