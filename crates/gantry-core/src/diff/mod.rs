pub mod parse;
pub mod types;
pub mod watcher;

// Re-export commonly used types
pub use parse::{FileSection, section_for_path, split_by_file};
pub use types::{DiffFile, DiffMode, DiffPayload, DiffSnapshot};
pub use watcher::DiffWatcher;
