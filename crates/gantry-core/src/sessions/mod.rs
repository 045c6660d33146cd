pub mod errors;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use errors::SessionError;
pub use registry::SessionRegistry;
pub use types::{BaseRepoInfo, SessionStatus, SessionSummary, TerminalKind};
