use crate::core::geom::{Pos, Rect};
use crate::core::layout::Insets;
use crate::core::style::Style;
use crate::error::{Error, Result};
use crate::page::PageHandle;
use crate::render::Painter;

use super::options::{clamp_ratio, Direction, LayoutOptions};

/// Arranges up to four content pages into bordered panes.
///
/// Pane rectangles are derived from the area passed to each call, so a terminal resize needs no
/// bookkeeping here.
#[derive(Debug)]
pub struct Compositor {
    options: LayoutOptions,
    pages: Vec<Option<PageHandle>>,
    selected: usize,
}

impl Compositor {
    pub fn new(options: LayoutOptions) -> Self {
        let mut compositor = Self {
            options: LayoutOptions::default(),
            pages: Vec::new(),
            selected: 0,
        };
        compositor.set_options(options);
        compositor
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Replaces the options. Pages bound to slots that still exist stay bound.
    pub fn set_options(&mut self, mut options: LayoutOptions) {
        options.warn_unsupported();
        options.ratio = clamp_ratio(options.ratio);
        self.pages.resize(options.pane_count(), None);
        if self.selected >= options.pane_count() {
            self.selected = 0;
        }
        self.options = options;
    }

    pub fn pane_count(&self) -> usize {
        self.options.pane_count()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn ratio(&self) -> f32 {
        self.options.ratio
    }

    /// Binds `pages` to slots `0..pages.len()`; slots past the end are left untouched.
    pub fn set_pages(&mut self, pages: Vec<PageHandle>) -> Result<()> {
        if pages.len() > self.pane_count() {
            return Err(Error::PaneIndex {
                index: pages.len() - 1,
                panes: self.pane_count(),
            });
        }
        for (slot, page) in self.pages.iter_mut().zip(pages) {
            *slot = Some(page);
        }
        Ok(())
    }

    pub fn set_page(&mut self, page: PageHandle, index: usize) -> Result<()> {
        let panes = self.pane_count();
        let slot = self
            .pages
            .get_mut(index)
            .ok_or(Error::PaneIndex { index, panes })?;
        *slot = Some(page);
        Ok(())
    }

    pub fn page(&self, index: usize) -> Option<PageHandle> {
        self.pages.get(index).and_then(Clone::clone)
    }

    /// Moves the selection to the next pane, wrapping after the last.
    pub fn change_layout(&mut self) -> usize {
        self.selected = (self.selected + 1) % self.pane_count().max(1);
        self.selected
    }

    pub fn increase_ratio(&mut self, step: f32) -> f32 {
        self.options.ratio = clamp_ratio(self.options.ratio + step);
        self.options.ratio
    }

    pub fn decrease_ratio(&mut self, step: f32) -> f32 {
        self.options.ratio = clamp_ratio(self.options.ratio - step);
        self.options.ratio
    }

    pub fn pane_rects(&self, area: Rect) -> Vec<Rect> {
        let direction = self.options.direction;
        let split = |rect: Rect, n: u16| match direction {
            Direction::Vertical => rect.columns(n),
            Direction::Horizontal => rect.rows(n),
        };
        let cross = |rect: Rect, n: u16| match direction {
            Direction::Vertical => rect.rows(n),
            Direction::Horizontal => rect.columns(n),
        };

        match self.pane_count() {
            1 => vec![area],
            2 => {
                let ratio = self.options.ratio;
                let (a, b) = match direction {
                    Direction::Vertical => area.split_left(scaled(area.w, ratio)),
                    Direction::Horizontal => area.split_top(scaled(area.h, ratio)),
                };
                vec![a, b]
            }
            3 => split(area, 3),
            _ => split(area, 2)
                .into_iter()
                .flat_map(|half| cross(half, 2))
                .collect(),
        }
    }

    /// Where a pane's page is drawn: inside the border when borders are on.
    pub fn content_rect(&self, pane: Rect) -> Rect {
        if self.options.show_border {
            pane.inset(Insets::all(1))
        } else {
            pane
        }
    }

    pub fn pane_at(&self, area: Rect, pos: Pos) -> Option<usize> {
        self.pane_rects(area).iter().position(|r| r.contains(pos))
    }

    pub fn draw(&self, painter: &mut Painter, area: Rect) {
        let multi = self.pane_count() > 1;
        for (index, rect) in self.pane_rects(area).into_iter().enumerate() {
            if self.options.show_border {
                let color = if multi && index == self.selected {
                    self.options.selected_box_color()
                } else {
                    self.options.box_color()
                };
                painter.titled_border(
                    rect,
                    Style::default().fg(color),
                    self.options.box_style,
                    self.options.title(index),
                );
            }

            let Some(page) = self.pages.get(index).and_then(Option::as_ref) else {
                continue;
            };
            let content = self.content_rect(rect);
            page.borrow_mut().paint(painter, content);
        }
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

fn scaled(len: u16, ratio: f32) -> u16 {
    (f32::from(len) * ratio).round() as u16
}

#[cfg(test)]
#[path = "../../tests/unit/layout/compositor.rs"]
mod tests;
