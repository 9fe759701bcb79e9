use std::any::Any;

use compact_str::CompactString;

use crate::core::geom::Rect;
use crate::render::Painter;

pub type WidgetId = CompactString;

/// What every registered control or popup must provide.
pub trait Widget: Any {
    fn id(&self) -> &str;

    /// Absolute bounding box in terminal cells.
    fn bounds(&self) -> Rect;

    fn is_visible(&self) -> bool {
        true
    }

    fn is_focused(&self) -> bool;

    fn focus(&mut self);

    fn unfocus(&mut self);

    fn draw(&self, painter: &mut Painter);

    /// Called with the new screen area after the terminal was resized.
    fn on_resize(&mut self, _area: Rect) {}

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Control,
    Popup,
}

/// How a listener handled an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResult {
    Ignored,
    /// Handled; the screen is redrawn.
    Consumed,
    /// The popup is done and closes with a positive outcome.
    Confirm,
    /// The popup is done and closes with a negative outcome.
    Cancel,
}

struct Entry {
    kind: WidgetKind,
    widget: Box<dyn Widget>,
}

/// Registered widgets in registration order, which doubles as the hit-test and focus order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `widget`. A widget already registered under the same id is replaced in place and
    /// returned.
    pub fn register(&mut self, kind: WidgetKind, widget: Box<dyn Widget>) -> Option<Box<dyn Widget>> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.widget.id() == widget.id()) {
            tracing::debug!(id = widget.id(), ?kind, "replacing registered widget");
            entry.kind = kind;
            return Some(std::mem::replace(&mut entry.widget, widget));
        }
        tracing::debug!(id = widget.id(), ?kind, "widget registered");
        self.entries.push(Entry { kind, widget });
        None
    }

    /// Removes the widget `id` if it is registered as `kind`; anything else is a no-op.
    pub fn unregister(&mut self, kind: WidgetKind, id: &str) -> Option<Box<dyn Widget>> {
        let index = self
            .entries
            .iter()
            .position(|e| e.kind == kind && e.widget.id() == id)?;
        tracing::debug!(id, ?kind, "widget unregistered");
        Some(self.entries.remove(index).widget)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.widget.id() == id)
    }

    pub fn kind_of(&self, id: &str) -> Option<WidgetKind> {
        self.entries
            .iter()
            .find(|e| e.widget.id() == id)
            .map(|e| e.kind)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Widget> {
        self.entries
            .iter()
            .find(|e| e.widget.id() == id)
            .map(|e| e.widget.as_ref())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut dyn Widget> {
        let entry = self.entries.iter_mut().find(|e| e.widget.id() == id)?;
        Some(entry.widget.as_mut())
    }

    pub fn count(&self, kind: WidgetKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn ids(&self, kind: WidgetKind) -> Vec<WidgetId> {
        self.of_kind(kind).map(|w| WidgetId::from(w.id())).collect()
    }

    /// Ids of focused widgets of either kind, in registration order.
    pub fn focused_ids(&self) -> Vec<WidgetId> {
        self.entries
            .iter()
            .filter(|e| e.widget.is_focused())
            .map(|e| WidgetId::from(e.widget.id()))
            .collect()
    }

    pub fn of_kind(&self, kind: WidgetKind) -> impl Iterator<Item = &dyn Widget> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.widget.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Widget>> + '_ {
        self.entries.iter_mut().map(|e| &mut e.widget)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/widget.rs"]
mod tests;
