use std::borrow::Cow;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::geom::{Pos, Rect};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift)
    }
}

/// One logical keypress. Multi-byte sequences (arrows, F-keys, UTF-8 chars) collapse into a
/// single record; `sequence` keeps the raw bytes as they arrived.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyRecord {
    pub name: CompactString,
    pub sequence: Vec<u8>,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    /// Escape-sequence code without the leading ESC (e.g. `"[A"`), when there was one.
    pub code: Option<CompactString>,
}

impl KeyRecord {
    pub fn new(name: impl Into<CompactString>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            ..Self::default()
        }
    }

    /// A record carrying raw bytes and no key name, as produced for unrecognized input.
    pub fn raw(sequence: impl Into<Vec<u8>>) -> Self {
        Self::new("", sequence)
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_code(mut self, code: impl Into<CompactString>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl,
            alt: self.alt || self.meta,
            shift: self.shift,
        }
    }

    pub fn sequence_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.sequence)
    }

    pub fn is_ctrl_c(&self) -> bool {
        self.ctrl && self.name == "c" && !self.alt && !self.meta
    }
}

/// A key combination such as `ctrl+l` or `shift+tab`, parsed from configuration strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo {
    pub name: CompactString,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(name: impl Into<CompactString>, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            modifiers,
        }
    }

    pub fn simple(name: impl Into<CompactString>) -> Self {
        Self::new(name, Modifiers::NONE)
    }

    pub fn ctrl(name: impl Into<CompactString>) -> Self {
        Self::new(
            name,
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        )
    }

    pub fn parse(value: &str) -> Option<Self> {
        let mut modifiers = Modifiers::NONE;
        let mut key_part: Option<&str> = None;
        for part in value.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" | "meta" => modifiers.alt = true,
                _ => key_part = Some(part),
            }
        }
        // A lone "+" names the plus key itself.
        let key_part = match key_part {
            Some(part) => part,
            None if value.trim() == "+" => "+",
            None => return None,
        };

        let mut chars = key_part.chars();
        let first = chars.next()?;
        let name: CompactString = if chars.next().is_none() {
            if first.is_ascii_uppercase() {
                modifiers.shift = true;
            }
            first.to_ascii_lowercase().to_string().into()
        } else {
            normalize_key_name(key_part)?
        };

        Some(Self { name, modifiers })
    }

    pub fn matches(&self, record: &KeyRecord) -> bool {
        record.name.eq_ignore_ascii_case(&self.name) && record.modifiers() == self.modifiers
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("shift+")?;
        }
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = crate::error::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(crate::error::Error::InvalidKey(value))
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}

fn normalize_key_name(value: &str) -> Option<CompactString> {
    let v = value.trim().to_ascii_lowercase();
    let name = match v.as_str() {
        "esc" | "escape" => "escape",
        "del" | "delete" => "delete",
        "ins" | "insert" => "insert",
        "pgup" | "pageup" => "pageup",
        "pgdown" | "pagedown" => "pagedown",
        "return" | "enter" | "tab" | "backspace" | "space" | "up" | "down" | "left" | "right"
        | "home" | "end" => v.as_str(),
        _ if v.starts_with('f') && v[1..].parse::<u8>().is_ok() => v.as_str(),
        _ => return None,
    };
    Some(name.into())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Pressed(MouseButton),
    Released(MouseButton),
    Drag(MouseButton),
    Moved,
    WheelUp,
    WheelDown,
}

/// A decoded mouse-tracking event. `pos` is 0-based and absolute unless the event was
/// translated for delivery to a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub pos: Pos,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, pos: Pos) -> Self {
        Self {
            kind,
            pos,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn is_left_press(&self) -> bool {
        self.kind == MouseEventKind::Pressed(MouseButton::Left)
    }

    pub fn is_wheel(&self) -> bool {
        matches!(self.kind, MouseEventKind::WheelUp | MouseEventKind::WheelDown)
    }

    /// The same event expressed relative to `bounds`.
    pub fn translated(&self, bounds: Rect) -> Self {
        Self {
            pos: bounds.relative(self.pos),
            ..*self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/event.rs"]
mod tests;
