//! Pane layout: options and the compositor that draws pages into panes.

pub mod compositor;
pub mod options;

pub use compositor::Compositor;
pub use options::{Direction, LayoutOptions, PaneCount, MAX_RATIO, MIN_RATIO};
