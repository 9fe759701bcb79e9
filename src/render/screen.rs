//! Line-diffing terminal writer.
//!
//! Every flush encodes the composed frame into one string per row (symbols plus SGR sequences)
//! and writes only the rows whose encoding changed since the previous flush.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Color as CColor, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{queue, Command};

use super::frame::FrameBuffer;
use crate::core::geom::Rect;
use crate::core::style::{Color, Mod, Style};

pub type SizeProbe = fn() -> io::Result<(u16, u16)>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub lines_written: usize,
    pub full_repaint: bool,
}

pub struct Screen<W: Write> {
    out: W,
    width: u16,
    height: u16,
    probe: Option<SizeProbe>,
    prev: Vec<String>,
    full_repaint: bool,
}

impl Screen<io::Stdout> {
    pub fn stdout() -> io::Result<Self> {
        Self::with_probe(io::stdout(), crossterm::terminal::size)
    }
}

impl<W: Write> Screen<W> {
    pub fn with_probe(out: W, probe: SizeProbe) -> io::Result<Self> {
        let (width, height) = probe()?;
        Ok(Self {
            out,
            width,
            height,
            probe: Some(probe),
            prev: Vec::new(),
            full_repaint: true,
        })
    }

    /// A screen with a fixed size that never queries the terminal.
    pub fn headless(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            width,
            height,
            probe: None,
            prev: Vec::new(),
            full_repaint: true,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Re-queries the terminal size. Returns the new size when it changed.
    pub fn sync_size(&mut self) -> io::Result<Option<(u16, u16)>> {
        let Some(probe) = self.probe else {
            return Ok(None);
        };
        let (w, h) = probe()?;
        Ok(self.resize(w, h).then_some((w, h)))
    }

    /// Applies a new size; a change forces the next flush to repaint everything.
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        tracing::debug!(width, height, "screen resized");
        self.width = width;
        self.height = height;
        self.invalidate();
        true
    }

    pub fn invalidate(&mut self) {
        self.prev.clear();
        self.full_repaint = true;
    }

    pub fn flush(&mut self, frame: &FrameBuffer) -> io::Result<FlushStats> {
        let area = frame.area();
        let mut stats = FlushStats {
            lines_written: 0,
            full_repaint: self.full_repaint,
        };

        if self.full_repaint {
            queue!(self.out, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
        }

        let mut lines = Vec::with_capacity(area.h as usize);
        for (i, y) in (area.y..area.bottom()).enumerate() {
            let line = encode_row(frame, y);
            if self.prev.get(i) != Some(&line) {
                queue!(self.out, MoveTo(area.x, y), Print(&line))?;
                stats.lines_written += 1;
            }
            lines.push(line);
        }

        self.out.flush()?;
        self.prev = lines;
        self.full_repaint = false;
        tracing::trace!(lines = stats.lines_written, full = stats.full_repaint, "flush");
        Ok(stats)
    }
}

/// Encodes one frame row as text with embedded SGR sequences. Each row starts and ends with the
/// default attributes so rows can be rewritten independently.
pub fn encode_row(frame: &FrameBuffer, y: u16) -> String {
    let mut line = String::new();
    let mut current = Style::default();
    for cell in frame.row(y) {
        if cell.symbol.is_empty() {
            continue;
        }
        if cell.style != current {
            write_style(&mut line, cell.style);
            current = cell.style;
        }
        line.push_str(&cell.symbol);
    }
    if current != Style::default() {
        write_ansi(&mut line, SetAttribute(Attribute::Reset));
    }
    line
}

fn write_style(line: &mut String, style: Style) {
    write_ansi(line, SetAttribute(Attribute::Reset));
    if let Some(fg) = style.fg {
        write_ansi(line, SetForegroundColor(to_crossterm_color(fg)));
    }
    if let Some(bg) = style.bg {
        write_ansi(line, SetBackgroundColor(to_crossterm_color(bg)));
    }
    for (m, attr) in [
        (Mod::BOLD, Attribute::Bold),
        (Mod::DIM, Attribute::Dim),
        (Mod::ITALIC, Attribute::Italic),
        (Mod::UNDERLINE, Attribute::Underlined),
        (Mod::REVERSE, Attribute::Reverse),
    ] {
        if style.mods.contains(m) {
            write_ansi(line, SetAttribute(attr));
        }
    }
}

fn write_ansi(line: &mut String, cmd: impl Command) {
    // Writing into a String cannot fail.
    let _ = cmd.write_ansi(line);
}

pub fn to_crossterm_color(c: Color) -> CColor {
    match c {
        Color::Reset => CColor::Reset,
        Color::Rgb(r, g, b) => CColor::Rgb { r, g, b },
        Color::Indexed(i) => CColor::AnsiValue(i),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/screen.rs"]
mod tests;
