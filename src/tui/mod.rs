//! Terminal plumbing: mode setup and restore, signals, and the stdin input source.

pub mod reader;
pub mod terminal_guard;

pub use reader::StdinSource;
pub use terminal_guard::{TerminalGuard, TerminalRestorer};
