use serde::{Deserialize, Serialize};

use crate::core::event::KeyCombo;
use crate::core::style::{parse_color, Color};
use crate::render::BorderKind;

pub const MIN_RATIO: f32 = 0.1;
pub const MAX_RATIO: f32 = 0.9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaneCount {
    Single,
    #[default]
    Double,
    Triple,
    Quad,
}

impl PaneCount {
    pub fn count(self) -> usize {
        match self {
            PaneCount::Single => 1,
            PaneCount::Double => 2,
            PaneCount::Triple => 3,
            PaneCount::Quad => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaneCount::Single => "single",
            PaneCount::Double => "double",
            PaneCount::Triple => "triple",
            PaneCount::Quad => "quad",
        }
    }
}

impl From<String> for PaneCount {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => PaneCount::Single,
            "double" | "2" => PaneCount::Double,
            "triple" | "3" => PaneCount::Triple,
            "quad" | "4" => PaneCount::Quad,
            other => {
                tracing::warn!(value = other, "unsupported layout type, using double");
                PaneCount::Double
            }
        }
    }
}

impl From<PaneCount> for String {
    fn from(value: PaneCount) -> Self {
        value.name().to_string()
    }
}

/// Split direction. `Vertical` places panes side by side, separated by vertical lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    #[serde(rename = "type")]
    pub pane_count: PaneCount,
    pub direction: Direction,
    pub show_border: bool,
    pub box_style: BorderKind,
    pub box_color: String,
    pub selected_box_color: String,
    pub show_title: bool,
    pub page_titles: Vec<String>,
    pub ratio: f32,
    pub change_focus_key: KeyCombo,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            pane_count: PaneCount::Double,
            direction: Direction::Vertical,
            show_border: true,
            box_style: BorderKind::Plain,
            box_color: "cyan".to_string(),
            selected_box_color: "white".to_string(),
            show_title: true,
            page_titles: Vec::new(),
            ratio: 0.5,
            change_focus_key: KeyCombo::ctrl("l"),
        }
    }
}

impl LayoutOptions {
    pub fn pane_count(&self) -> usize {
        self.pane_count.count()
    }

    pub fn box_color(&self) -> Color {
        color_or(&self.box_color, Color::CYAN)
    }

    pub fn selected_box_color(&self) -> Color {
        color_or(&self.selected_box_color, Color::WHITE)
    }

    pub fn title(&self, index: usize) -> Option<&str> {
        if !self.show_title {
            return None;
        }
        self.page_titles.get(index).map(String::as_str)
    }

    /// Logs the option values that will silently fall back to defaults.
    pub fn warn_unsupported(&self) {
        for (field, value) in [
            ("box_color", &self.box_color),
            ("selected_box_color", &self.selected_box_color),
        ] {
            if parse_color(value).is_none() {
                tracing::warn!(field, value = value.as_str(), "unknown color name");
            }
        }
        if !(MIN_RATIO..=MAX_RATIO).contains(&self.ratio) {
            tracing::warn!(ratio = self.ratio, "layout ratio out of range, clamping");
        }
    }

    /// Ratio pulled into the supported range; NaN falls back to an even split.
    pub fn clamped_ratio(&self) -> f32 {
        clamp_ratio(self.ratio)
    }
}

pub fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return 0.5;
    }
    ratio.clamp(MIN_RATIO, MAX_RATIO)
}

fn color_or(value: &str, fallback: Color) -> Color {
    parse_color(value).unwrap_or(fallback)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/options.rs"]
mod tests;
