//! Rendering: paint commands, the cell grid they rasterize into, and the diffing screen writer.
//!
//! Layout and widgets only ever see [`Painter`]; the grid and the terminal stay behind it.

use crate::core::geom::{Pos, Rect};

pub mod frame;
pub mod painter;
pub mod screen;

pub use frame::{Cell, FrameBuffer};
pub use painter::{BorderKind, PaintCmd, Painter};
pub use screen::{FlushStats, Screen};

pub trait Backend {
    fn draw(&mut self, area: Rect, cmds: &[PaintCmd]);

    fn set_cursor(&mut self, pos: Option<Pos>);
}
