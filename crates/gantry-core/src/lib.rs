//! gantry-core: Session-scoped terminal and diff synchronization core
//!
//! This library provides the in-process state layer for a desktop tool
//! that runs parallel AI agent sessions in isolated git worktrees. It
//! owns the session list, fans terminal output out to attached views,
//! and keeps per-session diffs fresh against bursty change events.
//!
//! # Main Entry Points
//!
//! - [`sessions`] - Session registry: lifecycle, selection, event routing
//! - [`terminal`] - Output multiplexer, fit scheduling, resize coalescing
//! - [`diff`] - Diff watcher, payload types, unified-diff splitting
//! - [`gateway`] - The backend command surface this core consumes
//! - [`config`] - Configuration management

pub mod config;
pub mod diff;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod sessions;
pub mod terminal;
pub mod title;

// Re-export commonly used types at crate root for convenience
pub use config::{DiffConfig, GantryConfig, TerminalConfig};
pub use diff::{DiffFile, DiffMode, DiffPayload, DiffSnapshot, DiffWatcher};
pub use events::BackendEvent;
pub use gateway::{BackendGateway, CreateSessionRequest, GatewayError, StartSessionRequest};
pub use sessions::{
    BaseRepoInfo, SessionError, SessionRegistry, SessionStatus, SessionSummary, TerminalKind,
};
pub use terminal::{FitScheduler, TerminalMux, Viewport};
pub use title::{ParsedTitle, parse_title_tag, title_from_branch};

// Re-export logging initialization
pub use logging::init_logging;
