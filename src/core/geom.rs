#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: u16,
    pub y: u16,
}

impl Pos {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    pub fn area(&self) -> usize {
        self.w as usize * self.h as usize
    }

    pub fn contains(&self, p: Pos) -> bool {
        if self.is_empty() {
            return false;
        }
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Position of `p` relative to the top-left corner, saturating at the origin.
    pub fn relative(&self, p: Pos) -> Pos {
        Pos::new(p.x.saturating_sub(self.x), p.y.saturating_sub(self.y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/geom.rs"]
mod tests;
