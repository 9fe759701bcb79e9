//! The composite cell grid one redraw cycle paints into.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::painter::{BorderKind, PaintCmd};
use super::Backend;
use crate::core::geom::{Pos, Rect};
use crate::core::style::Style;

/// One grid cell. Trailing halves of wide glyphs carry an empty symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub symbol: String,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: " ".to_string(),
            style: Style::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    area: Rect,
    cells: Vec<Cell>,
    cursor: Option<Pos>,
}

impl FrameBuffer {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            cells: vec![Cell::default(); area.area()],
            cursor: None,
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn cursor(&self) -> Option<Pos> {
        self.cursor
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        let idx = self.idx(x, y)?;
        self.cells.get(idx)
    }

    pub fn cell_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        let idx = self.idx(x, y)?;
        self.cells.get_mut(idx)
    }

    /// Cells of row `y`, left to right.
    pub fn row(&self, y: u16) -> &[Cell] {
        if y < self.area.y || y >= self.area.bottom() {
            return &[];
        }
        let w = self.area.w as usize;
        let start = (y - self.area.y) as usize * w;
        &self.cells[start..start + w]
    }

    /// Symbols of row `y` without styling.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y).iter().map(|c| c.symbol.as_str()).collect()
    }

    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if self.area.is_empty() {
            return None;
        }
        if x < self.area.x || y < self.area.y {
            return None;
        }
        if x >= self.area.right() || y >= self.area.bottom() {
            return None;
        }
        let rel_x = x - self.area.x;
        let rel_y = y - self.area.y;
        Some(rel_y as usize * self.area.w as usize + rel_x as usize)
    }
}

impl Backend for FrameBuffer {
    fn draw(&mut self, _area: Rect, cmds: &[PaintCmd]) {
        for cmd in cmds {
            match cmd {
                PaintCmd::FillRect { rect, style } => fill_rect(self, *rect, *style),
                PaintCmd::StyleRect { rect, style } => style_rect(self, *rect, *style),
                PaintCmd::HLine { pos, len, ch, style } => {
                    draw_hline(self, *pos, *len, *ch, *style)
                }
                PaintCmd::VLine { pos, len, ch, style } => {
                    draw_vline(self, *pos, *len, *ch, *style)
                }
                PaintCmd::Text {
                    pos,
                    text,
                    style,
                    clip,
                } => draw_text(self, *pos, text, *style, *clip),
                PaintCmd::Border { rect, style, kind } => draw_border(self, *rect, *style, *kind),
            }
        }
    }

    fn set_cursor(&mut self, pos: Option<Pos>) {
        self.cursor = pos;
    }
}

fn fill_rect(buf: &mut FrameBuffer, rect: Rect, style: Style) {
    let clip = rect.intersect(buf.area());
    if clip.is_empty() {
        return;
    }
    for y in clip.y..clip.bottom() {
        for x in clip.x..clip.right() {
            let Some(cell) = buf.cell_mut(x, y) else {
                continue;
            };
            cell.symbol = " ".to_string();
            cell.style = style;
        }
    }
}

fn style_rect(buf: &mut FrameBuffer, rect: Rect, style: Style) {
    let clip = rect.intersect(buf.area());
    if clip.is_empty() {
        return;
    }
    for y in clip.y..clip.bottom() {
        for x in clip.x..clip.right() {
            let Some(cell) = buf.cell_mut(x, y) else {
                continue;
            };
            cell.style = style;
        }
    }
}

fn put(buf: &mut FrameBuffer, x: u16, y: u16, symbol: &str, style: Style) {
    if let Some(cell) = buf.cell_mut(x, y) {
        cell.symbol.clear();
        cell.symbol.push_str(symbol);
        cell.style = style;
    }
}

fn draw_hline(buf: &mut FrameBuffer, pos: Pos, len: u16, ch: char, style: Style) {
    if len == 0 {
        return;
    }
    let clip = Rect::new(pos.x, pos.y, len, 1).intersect(buf.area());
    if clip.is_empty() {
        return;
    }
    let mut tmp = [0u8; 4];
    let symbol = ch.encode_utf8(&mut tmp);
    for x in clip.x..clip.right() {
        put(buf, x, clip.y, symbol, style);
    }
}

fn draw_vline(buf: &mut FrameBuffer, pos: Pos, len: u16, ch: char, style: Style) {
    if len == 0 {
        return;
    }
    let clip = Rect::new(pos.x, pos.y, 1, len).intersect(buf.area());
    if clip.is_empty() {
        return;
    }
    let mut tmp = [0u8; 4];
    let symbol = ch.encode_utf8(&mut tmp);
    for y in clip.y..clip.bottom() {
        put(buf, clip.x, y, symbol, style);
    }
}

fn draw_text(buf: &mut FrameBuffer, pos: Pos, text: &str, style: Style, clip: Option<Rect>) {
    let clip = clip.unwrap_or_else(|| buf.area()).intersect(buf.area());
    if clip.is_empty() {
        return;
    }
    let mut x = pos.x;
    let y = pos.y;
    if y < clip.y || y >= clip.bottom() {
        return;
    }
    for g in text.graphemes(true) {
        let w = UnicodeWidthStr::width(g) as u16;
        if w == 0 {
            continue;
        }
        if x >= clip.right() {
            break;
        }
        // Do not partially render wide glyphs.
        if w > 1 && x.saturating_add(w).saturating_sub(1) >= clip.right() {
            break;
        }
        if !clip.contains(Pos::new(x, y)) {
            x = x.saturating_add(w);
            continue;
        }

        put(buf, x, y, g, style);
        for dx in 1..w {
            put(buf, x.saturating_add(dx), y, "", style);
        }

        x = x.saturating_add(w);
    }
}

fn draw_border(buf: &mut FrameBuffer, rect: Rect, style: Style, kind: BorderKind) {
    if rect.w < 2 || rect.h < 2 {
        return;
    }

    let right = rect.right().saturating_sub(1);
    let bottom = rect.bottom().saturating_sub(1);
    let set = kind.symbols();

    put(buf, rect.x, rect.y, set.top_left, style);
    put(buf, right, rect.y, set.top_right, style);
    put(buf, rect.x, bottom, set.bottom_left, style);
    put(buf, right, bottom, set.bottom_right, style);

    for x in rect.x.saturating_add(1)..right {
        put(buf, x, rect.y, set.horizontal_top, style);
        put(buf, x, bottom, set.horizontal_bottom, style);
    }
    for y in rect.y.saturating_add(1)..bottom {
        put(buf, rect.x, y, set.vertical_left, style);
        put(buf, right, y, set.vertical_right, style);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
