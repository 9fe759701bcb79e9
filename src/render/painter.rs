use ratatui::symbols::border;
use serde::{Deserialize, Serialize};

use crate::core::geom::{Pos, Rect};
use crate::core::style::Style;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderKind {
    #[default]
    Plain,
    Rounded,
    Double,
    Thick,
}

impl BorderKind {
    pub fn symbols(self) -> border::Set {
        match self {
            BorderKind::Plain => border::PLAIN,
            BorderKind::Rounded => border::ROUNDED,
            BorderKind::Double => border::DOUBLE,
            BorderKind::Thick => border::THICK,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaintCmd {
    FillRect { rect: Rect, style: Style },
    /// Apply a style to the existing cells without changing their symbols.
    StyleRect { rect: Rect, style: Style },
    HLine {
        pos: Pos,
        len: u16,
        ch: char,
        style: Style,
    },
    VLine {
        pos: Pos,
        len: u16,
        ch: char,
        style: Style,
    },
    Text {
        pos: Pos,
        text: String,
        style: Style,
        clip: Option<Rect>,
    },
    Border {
        rect: Rect,
        style: Style,
        kind: BorderKind,
    },
}

#[derive(Debug, Default)]
pub struct Painter {
    cmds: Vec<PaintCmd>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn cmds(&self) -> &[PaintCmd] {
        &self.cmds
    }

    pub fn push(&mut self, cmd: PaintCmd) {
        self.cmds.push(cmd);
    }

    pub fn fill_rect(&mut self, rect: Rect, style: Style) {
        self.cmds.push(PaintCmd::FillRect { rect, style });
    }

    pub fn style_rect(&mut self, rect: Rect, style: Style) {
        self.cmds.push(PaintCmd::StyleRect { rect, style });
    }

    pub fn hline(&mut self, pos: Pos, len: u16, ch: char, style: Style) {
        self.cmds.push(PaintCmd::HLine { pos, len, ch, style });
    }

    pub fn vline(&mut self, pos: Pos, len: u16, ch: char, style: Style) {
        self.cmds.push(PaintCmd::VLine { pos, len, ch, style });
    }

    pub fn text(&mut self, pos: Pos, text: impl Into<String>, style: Style) {
        self.cmds.push(PaintCmd::Text {
            pos,
            text: text.into(),
            style,
            clip: None,
        });
    }

    pub fn text_clipped(&mut self, pos: Pos, text: impl Into<String>, style: Style, clip: Rect) {
        self.cmds.push(PaintCmd::Text {
            pos,
            text: text.into(),
            style,
            clip: Some(clip),
        });
    }

    pub fn border(&mut self, rect: Rect, style: Style, kind: BorderKind) {
        self.cmds.push(PaintCmd::Border { rect, style, kind });
    }

    /// Border plus a title overlaid on the top edge, `┌─ title ─┐` style.
    pub fn titled_border(
        &mut self,
        rect: Rect,
        style: Style,
        kind: BorderKind,
        title: Option<&str>,
    ) {
        self.border(rect, style, kind);
        let Some(title) = title.filter(|t| !t.is_empty()) else {
            return;
        };
        if rect.w < 5 || rect.h == 0 {
            return;
        }
        let clip = Rect::new(rect.x + 1, rect.y, rect.w - 2, 1);
        self.text_clipped(Pos::new(rect.x + 2, rect.y), format!(" {title} "), style, clip);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
