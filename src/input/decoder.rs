//! Raw terminal bytes to [`KeyRecord`]s.
//!
//! Reads can split an escape sequence anywhere, so incomplete sequences stay pending until the
//! rest arrives or the caller declares the input idle with [`KeyDecoder::flush`].

use compact_str::CompactString;

use crate::core::event::KeyRecord;

const ESC: u8 = 0x1b;

/// CSI sequences longer than this without a final byte are treated as garbage.
const MAX_CSI_LEN: usize = 64;

#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> Vec<KeyRecord> {
        self.pending.extend_from_slice(bytes);
        self.drain(false)
    }

    /// Emits whatever is still pending as-is. A lone ESC becomes the `escape` key.
    pub fn flush(&mut self) -> Vec<KeyRecord> {
        self.drain(true)
    }

    /// Decodes a complete byte string in one go, without touching any pending state.
    pub fn decode_all(bytes: &[u8]) -> Vec<KeyRecord> {
        let mut decoder = Self::new();
        let mut out = decoder.decode(bytes);
        out.extend(decoder.flush());
        out
    }

    fn drain(&mut self, force: bool) -> Vec<KeyRecord> {
        let mut out = Vec::new();
        let mut at = 0;
        while at < self.pending.len() {
            match parse_one(&self.pending[at..], force) {
                Some((record, len)) => {
                    out.push(record);
                    at += len;
                }
                None => break,
            }
        }
        self.pending.drain(..at);
        out
    }
}

/// Parses one record from the front of `buf`. `None` means more bytes are needed.
fn parse_one(buf: &[u8], force: bool) -> Option<(KeyRecord, usize)> {
    let first = *buf.first()?;
    match first {
        ESC => parse_escape(buf, force),
        0x80..=0xff => parse_utf8(buf, force),
        b => Some((single_byte(b), 1)),
    }
}

fn single_byte(b: u8) -> KeyRecord {
    let seq = vec![b];
    match b {
        b'\r' => KeyRecord::new("return", seq),
        b'\n' => KeyRecord::new("enter", seq),
        b'\t' => KeyRecord::new("tab", seq),
        0x7f | 0x08 => KeyRecord::new("backspace", seq),
        0x00 => KeyRecord::new("space", seq).ctrl(),
        0x01..=0x1a => {
            let ch = (b - 1 + b'a') as char;
            KeyRecord::new(CompactString::from(ch.to_string()), seq).ctrl()
        }
        0x1c..=0x1f => {
            let ch = (b + b'@') as char;
            KeyRecord::new(CompactString::from(ch.to_string()), seq).ctrl()
        }
        b' ' => KeyRecord::new("space", seq),
        b'A'..=b'Z' => {
            let ch = b.to_ascii_lowercase() as char;
            KeyRecord::new(CompactString::from(ch.to_string()), seq).shift()
        }
        0x21..=0x7e => KeyRecord::new(CompactString::from((b as char).to_string()), seq),
        _ => KeyRecord::raw(seq),
    }
}

fn parse_escape(buf: &[u8], force: bool) -> Option<(KeyRecord, usize)> {
    let Some(&second) = buf.get(1) else {
        return force.then(|| (KeyRecord::new("escape", vec![ESC]), 1));
    };
    match second {
        b'[' => parse_csi(buf, force),
        b'O' => parse_ss3(buf, force),
        ESC => Some((KeyRecord::new("escape", vec![ESC]), 1)),
        _ => {
            let (inner, len) = parse_one(&buf[1..], force)?;
            let mut record = inner.alt();
            record.sequence.insert(0, ESC);
            if record.name.is_empty() {
                record.alt = false;
                record.meta = false;
            }
            Some((record, len + 1))
        }
    }
}

fn parse_csi(buf: &[u8], force: bool) -> Option<(KeyRecord, usize)> {
    let mut final_at = None;
    for (i, &b) in buf.iter().enumerate().skip(2) {
        if (0x40..=0x7e).contains(&b) {
            final_at = Some(i);
            break;
        }
        if !(0x20..=0x3f).contains(&b) || i >= MAX_CSI_LEN {
            // Malformed: hand back what we have and resynchronize on the next byte.
            return Some((KeyRecord::raw(buf[..i].to_vec()), i));
        }
    }

    let Some(final_at) = final_at else {
        return force.then(|| (KeyRecord::raw(buf.to_vec()), buf.len()));
    };
    let len = final_at + 1;
    let seq = buf[..len].to_vec();
    let code = CompactString::from(String::from_utf8_lossy(&seq[1..]));
    let params = std::str::from_utf8(&buf[2..final_at]).unwrap_or("");

    // Mouse reports start out unnamed; the mouse parser recognizes them by their bytes.
    if params.starts_with('<') || (params.is_empty() && buf[final_at] == b'M') {
        return Some((KeyRecord::raw(seq).with_code(code), len));
    }

    let mut parts = params.split(';');
    let key_num = parts.next().and_then(|p| p.parse::<u16>().ok());
    let modifier = parts.next().and_then(|p| p.parse::<u8>().ok()).unwrap_or(1);

    let name = match buf[final_at] {
        b'A' => "up",
        b'B' => "down",
        b'C' => "right",
        b'D' => "left",
        b'H' => "home",
        b'F' => "end",
        b'Z' => "tab",
        b'P' => "f1",
        b'Q' => "f2",
        b'R' => "f3",
        b'S' => "f4",
        b'~' => match key_num {
            Some(1 | 7) => "home",
            Some(2) => "insert",
            Some(3) => "delete",
            Some(4 | 8) => "end",
            Some(5) => "pageup",
            Some(6) => "pagedown",
            Some(11) => "f1",
            Some(12) => "f2",
            Some(13) => "f3",
            Some(14) => "f4",
            Some(15) => "f5",
            Some(17) => "f6",
            Some(18) => "f7",
            Some(19) => "f8",
            Some(20) => "f9",
            Some(21) => "f10",
            Some(23) => "f11",
            Some(24) => "f12",
            _ => "",
        },
        _ => "",
    };

    let mut record = KeyRecord::new(name, seq).with_code(code);
    if buf[final_at] == b'Z' {
        record.shift = true;
    }
    apply_modifier(&mut record, modifier);
    Some((record, len))
}

fn parse_ss3(buf: &[u8], force: bool) -> Option<(KeyRecord, usize)> {
    let Some(&last) = buf.get(2) else {
        return force.then(|| (KeyRecord::raw(buf.to_vec()), buf.len()));
    };
    let name = match last {
        b'A' => "up",
        b'B' => "down",
        b'C' => "right",
        b'D' => "left",
        b'H' => "home",
        b'F' => "end",
        b'P' => "f1",
        b'Q' => "f2",
        b'R' => "f3",
        b'S' => "f4",
        b'M' => "return",
        _ => "",
    };
    let seq = buf[..3].to_vec();
    let code = CompactString::from(String::from_utf8_lossy(&seq[1..]));
    Some((KeyRecord::new(name, seq).with_code(code), 3))
}

fn parse_utf8(buf: &[u8], force: bool) -> Option<(KeyRecord, usize)> {
    let expected = match buf[0] {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Some((KeyRecord::raw(vec![buf[0]]), 1)),
    };
    if buf.len() < expected {
        if force || buf[1..].iter().any(|b| !(0x80..=0xbf).contains(b)) {
            return Some((KeyRecord::raw(vec![buf[0]]), 1));
        }
        return None;
    }
    match std::str::from_utf8(&buf[..expected]) {
        Ok(s) => Some((KeyRecord::new(s, buf[..expected].to_vec()), expected)),
        Err(_) => Some((KeyRecord::raw(vec![buf[0]]), 1)),
    }
}

/// xterm modifier parameter: 1 + (shift=1 | alt=2 | ctrl=4 | meta=8).
fn apply_modifier(record: &mut KeyRecord, modifier: u8) {
    let bits = modifier.saturating_sub(1);
    if bits & 1 != 0 {
        record.shift = true;
    }
    if bits & 2 != 0 {
        record.alt = true;
    }
    if bits & 4 != 0 {
        record.ctrl = true;
    }
    if bits & 8 != 0 {
        record.meta = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/decoder.rs"]
mod tests;
