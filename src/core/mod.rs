//! Core primitives shared by every layer: geometry, styles and input records.
//!
//! Nothing in here touches the terminal; the renderer and the dispatcher build on top.

pub mod event;
pub mod geom;
pub mod layout;
pub mod style;

pub use event::{KeyCombo, KeyRecord, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use geom::{Pos, Rect};
pub use layout::Insets;
pub use style::{parse_color, Color, Mod, Style};
