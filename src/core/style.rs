use std::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Reset,
    Rgb(u8, u8, u8),
    Indexed(u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const GRAY: Color = Color::Indexed(7);
    pub const DARK_GRAY: Color = Color::Indexed(8);
    pub const WHITE: Color = Color::Indexed(15);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Mod(u16);

impl Mod {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1 << 0);
    pub const DIM: Self = Self(1 << 1);
    pub const UNDERLINE: Self = Self(1 << 2);
    pub const REVERSE: Self = Self(1 << 3);
    pub const ITALIC: Self = Self(1 << 4);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Mod {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mod {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub mods: Mod,
}

impl Style {
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn add_mod(mut self, m: Mod) -> Self {
        self.mods |= m;
        self
    }

    /// Merge `other` on top of `self`.
    pub fn patch(mut self, other: Style) -> Self {
        if let Some(fg) = other.fg {
            self.fg = Some(fg);
        }
        if let Some(bg) = other.bg {
            self.bg = Some(bg);
        }
        self.mods |= other.mods;
        self
    }
}

/// Parses a color name (`"white"`, `"dark_gray"`) or a `#rrggbb` hex string.
pub fn parse_color(value: &str) -> Option<Color> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }

    if let Some(hex) = v.strip_prefix('#') {
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }

    let v = v.to_ascii_lowercase();
    let c = match v.as_str() {
        "reset" => Color::Reset,
        "black" => Color::BLACK,
        "red" => Color::RED,
        "green" => Color::GREEN,
        "yellow" => Color::YELLOW,
        "blue" => Color::BLUE,
        "magenta" => Color::MAGENTA,
        "cyan" => Color::CYAN,
        "gray" | "grey" => Color::GRAY,
        "dark_gray" | "darkgrey" | "blackbright" => Color::DARK_GRAY,
        "white" | "whitebright" => Color::WHITE,
        "light_red" | "redbright" => Color::Indexed(9),
        "light_green" | "greenbright" => Color::Indexed(10),
        "light_yellow" | "yellowbright" => Color::Indexed(11),
        "light_blue" | "bluebright" => Color::Indexed(12),
        "light_magenta" | "magentabright" => Color::Indexed(13),
        "light_cyan" | "cyanbright" => Color::Indexed(14),
        _ => return None,
    };

    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/core/style.rs"]
mod tests;
