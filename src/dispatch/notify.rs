use std::collections::VecDeque;

use crate::core::event::{KeyRecord, MouseEvent};

/// Events the dispatcher reports to the host, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// A key no popup was in a position to claim.
    KeyPressed(KeyRecord),
    Mouse(MouseEvent),
    Resize { w: u16, h: u16 },
    /// ctrl+c was pressed; input processing has stopped.
    Exit,
    LayoutRatioChanged(f32),
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn push(&mut self, notification: Notification) {
        self.queue.push_back(notification);
    }

    pub fn pop(&mut self) -> Option<Notification> {
        self.queue.pop_front()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
