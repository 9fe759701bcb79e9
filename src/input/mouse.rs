//! Mouse-tracking parser over decoded key records.
//!
//! Recognizes SGR (`ESC [ < b ; x ; y M|m`) and X10 (`ESC [ M` + three bytes) reports. A report
//! may arrive in one record or spread over several, so the parser keeps the bytes of a pending
//! report between calls and tells the caller what each record turned out to be.

use crate::core::event::{KeyRecord, Modifiers, MouseButton, MouseEvent, MouseEventKind};
use crate::core::geom::Pos;

const SGR_PREFIX: &[u8] = b"\x1b[<";
const X10_PREFIX: &[u8] = b"\x1b[M";

pub const DEFAULT_LIMIT: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseFrame {
    /// The record opened a mouse report.
    Start,
    /// The record extended the pending report.
    Continue,
    /// The record finished a report.
    Complete(MouseEvent),
    /// Not mouse input; dispatch it as a key.
    Passthrough,
}

enum Scan {
    Incomplete,
    Done(MouseEvent),
    Invalid,
}

#[derive(Debug)]
pub struct MouseParser {
    pending: Option<Vec<u8>>,
    limit: usize,
    last_pressed: Option<MouseButton>,
    abandoned: Option<Vec<u8>>,
}

impl Default for MouseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseParser {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// `limit` caps how many bytes a pending report may collect before it is given up.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            pending: None,
            limit: limit.max(X10_PREFIX.len() + 3),
            last_pressed: None,
            abandoned: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn feed(&mut self, record: &KeyRecord) -> MouseFrame {
        if let Some(mut buf) = self.pending.take() {
            let kept = buf.len();
            buf.extend_from_slice(&record.sequence);
            match self.scan(&buf) {
                Scan::Incomplete => {
                    self.pending = Some(buf);
                    return MouseFrame::Continue;
                }
                Scan::Done(event) => return MouseFrame::Complete(event),
                Scan::Invalid => {
                    tracing::debug!(bytes = kept, "abandoning malformed mouse report");
                    buf.truncate(kept);
                    self.abandon(buf);
                }
            }
        }
        self.classify(record)
    }

    /// Gives up on a pending report, e.g. when input went idle before it completed.
    /// Returns whether anything was pending.
    pub fn expire(&mut self) -> bool {
        match self.pending.take() {
            Some(buf) => {
                tracing::debug!(bytes = buf.len(), "mouse report timed out");
                self.abandon(buf);
                true
            }
            None => false,
        }
    }

    /// Bytes of reports given up since the last call. They were never a mouse event and should
    /// be delivered as ordinary keys.
    pub fn take_abandoned(&mut self) -> Option<Vec<u8>> {
        self.abandoned.take()
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.abandoned = None;
    }

    fn abandon(&mut self, buf: Vec<u8>) {
        self.abandoned.get_or_insert_with(Vec::new).extend(buf);
    }

    fn classify(&mut self, record: &KeyRecord) -> MouseFrame {
        let bytes = record.sequence.as_slice();
        let opens = bytes.starts_with(SGR_PREFIX)
            || bytes.starts_with(X10_PREFIX)
            // A bare fragment of the prefix, but only from records that aren't real keys.
            || (record.name.is_empty() && !bytes.is_empty() && is_prefix_fragment(bytes));
        if !opens {
            return MouseFrame::Passthrough;
        }
        match self.scan(bytes) {
            Scan::Incomplete => {
                self.pending = Some(bytes.to_vec());
                MouseFrame::Start
            }
            Scan::Done(event) => MouseFrame::Complete(event),
            Scan::Invalid => MouseFrame::Passthrough,
        }
    }

    fn scan(&mut self, buf: &[u8]) -> Scan {
        if buf.len() > self.limit {
            return Scan::Invalid;
        }
        if let Some(rest) = buf.strip_prefix(SGR_PREFIX) {
            return scan_sgr(rest);
        }
        if let Some(rest) = buf.strip_prefix(X10_PREFIX) {
            return match rest.len() {
                0..=2 => Scan::Incomplete,
                3 => Scan::Done(self.decode_x10(rest[0], rest[1], rest[2])),
                _ => Scan::Invalid,
            };
        }
        if is_prefix_fragment(buf) {
            Scan::Incomplete
        } else {
            Scan::Invalid
        }
    }

    fn decode_x10(&mut self, cb: u8, cx: u8, cy: u8) -> MouseEvent {
        let cb = u16::from(cb.saturating_sub(32));
        let pos = Pos::new(
            u16::from(cx.saturating_sub(33)),
            u16::from(cy.saturating_sub(33)),
        );
        let modifiers = decode_modifiers(cb);
        let kind = if cb & 64 != 0 {
            wheel_kind(cb)
        } else if cb & 3 == 3 {
            if cb & 32 != 0 {
                MouseEventKind::Moved
            } else {
                MouseEventKind::Released(self.last_pressed.take().unwrap_or(MouseButton::Left))
            }
        } else {
            let button = button_of(cb);
            if cb & 32 != 0 {
                MouseEventKind::Drag(button)
            } else {
                self.last_pressed = Some(button);
                MouseEventKind::Pressed(button)
            }
        };
        MouseEvent {
            kind,
            pos,
            modifiers,
        }
    }
}

fn is_prefix_fragment(bytes: &[u8]) -> bool {
    bytes.len() < SGR_PREFIX.len() && SGR_PREFIX.starts_with(bytes)
}

fn scan_sgr(rest: &[u8]) -> Scan {
    let Some(end) = rest.iter().position(|b| !(b.is_ascii_digit() || *b == b';')) else {
        return Scan::Incomplete;
    };
    let terminator = rest[end];
    if !matches!(terminator, b'M' | b'm') || end + 1 != rest.len() {
        return Scan::Invalid;
    }
    let Ok(fields) = std::str::from_utf8(&rest[..end]) else {
        return Scan::Invalid;
    };
    let Ok(nums) = fields.split(';').map(str::parse::<u16>).collect::<Result<Vec<_>, _>>() else {
        return Scan::Invalid;
    };
    let [cb, cx, cy] = nums.as_slice() else {
        return Scan::Invalid;
    };
    Scan::Done(decode_sgr(*cb, *cx, *cy, terminator == b'm'))
}

fn decode_sgr(cb: u16, cx: u16, cy: u16, release: bool) -> MouseEvent {
    let pos = Pos::new(cx.saturating_sub(1), cy.saturating_sub(1));
    let modifiers = decode_modifiers(cb);
    let kind = if cb & 64 != 0 {
        wheel_kind(cb)
    } else if cb & 32 != 0 {
        if cb & 3 == 3 {
            MouseEventKind::Moved
        } else {
            MouseEventKind::Drag(button_of(cb))
        }
    } else if release {
        MouseEventKind::Released(button_of(cb))
    } else {
        MouseEventKind::Pressed(button_of(cb))
    };
    MouseEvent {
        kind,
        pos,
        modifiers,
    }
}

fn button_of(cb: u16) -> MouseButton {
    match cb & 3 {
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Left,
    }
}

fn wheel_kind(cb: u16) -> MouseEventKind {
    if cb & 1 == 0 {
        MouseEventKind::WheelUp
    } else {
        MouseEventKind::WheelDown
    }
}

fn decode_modifiers(cb: u16) -> Modifiers {
    Modifiers {
        shift: cb & 4 != 0,
        alt: cb & 8 != 0,
        ctrl: cb & 16 != 0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/mouse.rs"]
mod tests;
