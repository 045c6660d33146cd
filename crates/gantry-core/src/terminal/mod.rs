pub mod buffer;
pub mod fit;
pub mod mux;
pub mod resize;

// Re-export commonly used types
pub use buffer::LineBuffer;
pub use fit::{FitScheduler, Viewport};
pub use mux::{TERMINAL_RESET, TerminalMux};
pub use resize::ResizeCoalescer;
