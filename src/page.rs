//! Scrollable styled-text model rendered into panes and popups.

use std::cell::RefCell;
use std::rc::Rc;

use unicode_width::UnicodeWidthStr;

use crate::core::geom::{Pos, Rect};
use crate::core::style::{Color, Style};
use crate::render::Painter;

/// Shared handle to a page: the host keeps one to append rows, the layout keeps another to draw.
pub type PageHandle = Rc<RefCell<ContentPage>>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn width(&self) -> usize {
        UnicodeWidthStr::width(self.text.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    spans: Vec<Span>,
}

impl Row {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::new(text, style)],
        }
    }

    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self::new(text, Style::default().fg(color))
    }

    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Style of the first span; the "color tag" of a single-span row.
    pub fn style(&self) -> Style {
        self.spans.first().map(|s| s.style).unwrap_or_default()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }
}

impl From<&str> for Row {
    fn from(text: &str) -> Self {
        Row::new(text, Style::default())
    }
}

#[derive(Clone, Debug)]
pub struct ContentPage {
    rows: Vec<Row>,
    rows_per_page: usize,
    scroll_index: usize,
    max_rows: Option<usize>,
}

impl Default for ContentPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentPage {
    pub const DEFAULT_ROWS_PER_PAGE: usize = 100;

    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            rows_per_page: Self::DEFAULT_ROWS_PER_PAGE,
            scroll_index: 0,
            max_rows: None,
        }
    }

    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows: Some(max_rows.max(1)),
            ..Self::new()
        }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn scroll_index(&self) -> usize {
        self.scroll_index
    }

    /// Appends a row. The scroll position is left where it was.
    pub fn add_row(&mut self, row: impl Into<Row>) {
        self.rows.push(row.into());
        if let Some(max) = self.max_rows {
            if self.rows.len() > max {
                let excess = self.rows.len() - max;
                self.rows.drain(..excess);
            }
        }
        self.clamp_scroll();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.scroll_index = 0;
    }

    pub fn set_rows_per_page(&mut self, n: usize) {
        self.rows_per_page = n;
        self.clamp_scroll();
    }

    pub fn set_scroll_index(&mut self, index: usize) {
        self.scroll_index = index.min(self.max_scroll());
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_index = 0;
    }

    /// Scrolls one row towards older content.
    pub fn increase_scroll_index(&mut self) {
        self.set_scroll_index(self.scroll_index.saturating_add(1));
    }

    /// Scrolls one row towards the newest content.
    pub fn decrease_scroll_index(&mut self) {
        self.set_scroll_index(self.scroll_index.saturating_sub(1));
    }

    pub fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(self.rows_per_page)
    }

    /// The window of rows currently in view, oldest first. The iterator is cheap to recreate.
    pub fn visible_rows(&self) -> std::slice::Iter<'_, Row> {
        let end = self.rows.len() - self.scroll_index;
        let start = end.saturating_sub(self.rows_per_page);
        self.rows[start..end].iter()
    }

    /// Fits the window to `content` and paints the visible rows into it, top-aligned and clipped.
    pub fn paint(&mut self, painter: &mut Painter, content: Rect) {
        self.set_rows_per_page(usize::from(content.h));
        for (y, row) in (content.y..content.bottom()).zip(self.visible_rows()) {
            let mut x = content.x;
            for span in row.spans() {
                if x >= content.right() {
                    break;
                }
                painter.text_clipped(Pos::new(x, y), span.text.as_str(), span.style, content);
                x = x.saturating_add(u16::try_from(span.width()).unwrap_or(u16::MAX));
            }
        }
    }

    fn clamp_scroll(&mut self) {
        self.scroll_index = self.scroll_index.min(self.max_scroll());
    }
}

#[cfg(test)]
#[path = "../tests/unit/page.rs"]
mod tests;
