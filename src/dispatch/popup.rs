use std::any::Any;

use crate::core::event::KeyRecord;
use crate::core::geom::Rect;
use crate::core::layout::Insets;
use crate::core::style::{Color, Style};
use crate::page::PageHandle;
use crate::render::{BorderKind, Painter};

use super::widget::{EventResult, Widget};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupOutcome {
    Confirmed,
    Cancelled,
}

/// Completion handler of a popup. Runs at most once; later calls are ignored.
pub struct OnceHook {
    hook: Option<Box<dyn FnOnce(PopupOutcome)>>,
}

impl OnceHook {
    pub fn new(hook: impl FnOnce(PopupOutcome) + 'static) -> Self {
        Self {
            hook: Some(Box::new(hook)),
        }
    }

    /// Returns whether the hook ran.
    pub fn fire(&mut self, outcome: PopupOutcome) -> bool {
        match self.hook.take() {
            Some(hook) => {
                hook(outcome);
                true
            }
            None => false,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.hook.is_none()
    }
}

impl std::fmt::Debug for OnceHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceHook")
            .field("spent", &self.is_spent())
            .finish()
    }
}

pub const LOG_POPUP_ID: &str = "panekit.log";

/// The dispatcher's log page in a centered, scrollable box.
pub struct LogPopup {
    page: PageHandle,
    bounds: Rect,
    focused: bool,
}

impl LogPopup {
    pub fn new(page: PageHandle, screen: Rect) -> Self {
        Self {
            page,
            bounds: Self::place(screen),
            focused: false,
        }
    }

    fn place(screen: Rect) -> Rect {
        let w = (u32::from(screen.w) * 4 / 5) as u16;
        let h = (u32::from(screen.h) * 4 / 5) as u16;
        screen.centered(w.max(10), h.max(3))
    }

    pub fn handle_key(&mut self, key: &KeyRecord) -> EventResult {
        let mut page = self.page.borrow_mut();
        match key.name.as_str() {
            "up" => page.increase_scroll_index(),
            "down" => page.decrease_scroll_index(),
            "pageup" => {
                let step = page.rows_per_page().max(1);
                let target = page.scroll_index().saturating_add(step);
                page.set_scroll_index(target);
            }
            "pagedown" => {
                let step = page.rows_per_page().max(1);
                let target = page.scroll_index().saturating_sub(step);
                page.set_scroll_index(target);
            }
            "escape" | "q" | "return" | "enter" => return EventResult::Cancel,
            _ => return EventResult::Ignored,
        }
        EventResult::Consumed
    }
}

impl Widget for LogPopup {
    fn id(&self) -> &str {
        LOG_POPUP_ID
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn unfocus(&mut self) {
        self.focused = false;
    }

    fn draw(&self, painter: &mut Painter) {
        let border = Style::default().fg(if self.focused {
            Color::WHITE
        } else {
            Color::DARK_GRAY
        });
        painter.fill_rect(self.bounds, Style::default());
        painter.titled_border(self.bounds, border, BorderKind::Rounded, Some("log"));

        let content = self.bounds.inset(Insets::all(1));
        self.page.borrow_mut().paint(painter, content);
    }

    fn on_resize(&mut self, area: Rect) {
        self.bounds = Self::place(area);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/popup.rs"]
mod tests;
