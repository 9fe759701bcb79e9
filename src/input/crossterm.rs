//! Conversions for hosts that already read terminal events through crossterm.

use compact_str::CompactString;

use crate::core::event::{KeyRecord, Modifiers, MouseButton, MouseEvent, MouseEventKind};
use crate::core::geom::Pos;

/// Converts a crossterm key event. Release events and keys with no terminal encoding yield
/// `None`.
pub fn into_key_record(event: crossterm::event::KeyEvent) -> Option<KeyRecord> {
    if event.kind == crossterm::event::KeyEventKind::Release {
        return None;
    }
    let mods = into_modifiers(event.modifiers);
    let (name, sequence): (CompactString, Vec<u8>) = match event.code {
        crossterm::event::KeyCode::Char(ch) => char_record(ch, mods),
        crossterm::event::KeyCode::Null => ("space".into(), vec![0]),
        crossterm::event::KeyCode::Enter => ("return".into(), b"\r".to_vec()),
        crossterm::event::KeyCode::Tab => ("tab".into(), b"\t".to_vec()),
        crossterm::event::KeyCode::BackTab => ("tab".into(), b"\x1b[Z".to_vec()),
        crossterm::event::KeyCode::Esc => ("escape".into(), vec![0x1b]),
        crossterm::event::KeyCode::Backspace => ("backspace".into(), vec![0x7f]),
        crossterm::event::KeyCode::Delete => ("delete".into(), b"\x1b[3~".to_vec()),
        crossterm::event::KeyCode::Insert => ("insert".into(), b"\x1b[2~".to_vec()),
        crossterm::event::KeyCode::Up => ("up".into(), b"\x1b[A".to_vec()),
        crossterm::event::KeyCode::Down => ("down".into(), b"\x1b[B".to_vec()),
        crossterm::event::KeyCode::Right => ("right".into(), b"\x1b[C".to_vec()),
        crossterm::event::KeyCode::Left => ("left".into(), b"\x1b[D".to_vec()),
        crossterm::event::KeyCode::Home => ("home".into(), b"\x1b[H".to_vec()),
        crossterm::event::KeyCode::End => ("end".into(), b"\x1b[F".to_vec()),
        crossterm::event::KeyCode::PageUp => ("pageup".into(), b"\x1b[5~".to_vec()),
        crossterm::event::KeyCode::PageDown => ("pagedown".into(), b"\x1b[6~".to_vec()),
        crossterm::event::KeyCode::F(n) => (CompactString::from(format!("f{n}")), Vec::new()),
        _ => return None,
    };

    let mut record = KeyRecord::new(name, sequence);
    record.ctrl = mods.ctrl || event.code == crossterm::event::KeyCode::Null;
    record.alt = mods.alt;
    record.meta = mods.alt;
    record.shift = mods.shift
        || match event.code {
            crossterm::event::KeyCode::BackTab => true,
            crossterm::event::KeyCode::Char(ch) => ch.is_ascii_uppercase(),
            _ => false,
        };
    if record.sequence.first() == Some(&0x1b) && record.sequence.len() > 1 {
        let code = CompactString::from(String::from_utf8_lossy(&record.sequence[1..]));
        record.code = Some(code);
    }
    Some(record)
}

fn char_record(ch: char, mods: Modifiers) -> (CompactString, Vec<u8>) {
    let lower = ch.to_ascii_lowercase();
    let name = match lower {
        ' ' => CompactString::from("space"),
        c => CompactString::from(c.to_string()),
    };
    let sequence = if mods.ctrl && lower.is_ascii_lowercase() {
        vec![lower as u8 - b'a' + 1]
    } else {
        let mut buf = [0u8; 4];
        ch.encode_utf8(&mut buf).as_bytes().to_vec()
    };
    let mut sequence = sequence;
    if mods.alt {
        sequence.insert(0, 0x1b);
    }
    (name, sequence)
}

pub fn into_modifiers(mods: crossterm::event::KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(crossterm::event::KeyModifiers::CONTROL),
        alt: mods.contains(crossterm::event::KeyModifiers::ALT),
        shift: mods.contains(crossterm::event::KeyModifiers::SHIFT),
    }
}

/// Converts a crossterm mouse event. Horizontal scrolling has no counterpart and yields `None`.
pub fn into_mouse_event(event: crossterm::event::MouseEvent) -> Option<MouseEvent> {
    let kind = match event.kind {
        crossterm::event::MouseEventKind::Down(b) => MouseEventKind::Pressed(into_button(b)),
        crossterm::event::MouseEventKind::Up(b) => MouseEventKind::Released(into_button(b)),
        crossterm::event::MouseEventKind::Drag(b) => MouseEventKind::Drag(into_button(b)),
        crossterm::event::MouseEventKind::Moved => MouseEventKind::Moved,
        crossterm::event::MouseEventKind::ScrollUp => MouseEventKind::WheelUp,
        crossterm::event::MouseEventKind::ScrollDown => MouseEventKind::WheelDown,
        _ => return None,
    };
    Some(MouseEvent {
        kind,
        pos: Pos::new(event.column, event.row),
        modifiers: into_modifiers(event.modifiers),
    })
}

fn into_button(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/crossterm.rs"]
mod tests;
