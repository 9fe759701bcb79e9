use super::widget::WidgetId;

/// Ids that lost focus when a modal widget took it. Each popup opens its own frame, so closing
/// an inner popup hands focus back to the outer one only.
#[derive(Debug, Default)]
pub struct FocusStack {
    frames: Vec<Vec<WidgetId>>,
}

impl FocusStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Records `id` in the newest frame, opening one if there is none.
    pub fn push(&mut self, id: WidgetId) {
        if self.frames.is_empty() {
            self.open_frame();
        }
        if let Some(frame) = self.frames.last_mut() {
            if !frame.contains(&id) {
                frame.push(id);
            }
        }
    }

    /// Pops the newest frame, returning its ids in the order they were pushed.
    pub fn take(&mut self) -> Vec<WidgetId> {
        self.frames.pop().unwrap_or_default()
    }

    /// Every remembered id, oldest frame first.
    pub fn ids(&self) -> Vec<WidgetId> {
        self.frames.iter().flatten().cloned().collect()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn len(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
