use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::event::KeyCombo;
use crate::error::Result;
use crate::layout::LayoutOptions;

/// Where the dispatcher's log page is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LogLocationRepr", into = "LogLocationRepr")]
pub enum LogLocation {
    Pane(usize),
    /// Only inside the on-demand log popup.
    #[default]
    Popup,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LogLocationRepr {
    Index(usize),
    Name(String),
}

impl From<LogLocationRepr> for LogLocation {
    fn from(repr: LogLocationRepr) -> Self {
        match repr {
            LogLocationRepr::Index(i) => LogLocation::Pane(i),
            LogLocationRepr::Name(name) => match name.trim().parse::<usize>() {
                Ok(i) => LogLocation::Pane(i),
                Err(_) => {
                    if !name.eq_ignore_ascii_case("popup") {
                        tracing::warn!(value = %name, "unknown log location, using popup");
                    }
                    LogLocation::Popup
                }
            },
        }
    }
}

impl From<LogLocation> for LogLocationRepr {
    fn from(location: LogLocation) -> Self {
        match location {
            LogLocation::Pane(i) => LogLocationRepr::Index(i),
            LogLocation::Popup => LogLocationRepr::Name("popup".to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_location: LogLocation,
    /// Rows kept in the log page before the oldest are dropped.
    pub log_page_size: usize,
    pub layout: LayoutOptions,
    /// Off unless requested; without it mouse reports reach listeners as plain keys.
    pub enable_mouse: bool,
    /// Makes `logging::init` tee host tracing events and the dispatcher show them in the log page.
    pub intercept_tracing: bool,
    pub focus_key: KeyCombo,
    pub show_log_key: KeyCombo,
    /// Shorthand for `layout.change_focus_key`; wins when both are given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_key: Option<KeyCombo>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_location: LogLocation::Popup,
            log_page_size: 1000,
            layout: LayoutOptions::default(),
            enable_mouse: false,
            intercept_tracing: false,
            focus_key: KeyCombo::simple("tab"),
            show_log_key: KeyCombo::ctrl("p"),
            layout_key: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Like [`Config::load`], but a missing or broken file yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "using default config");
                Self::default()
            }
        }
    }

    /// Layout options with `layout_key` folded in.
    pub fn layout_options(&self) -> LayoutOptions {
        let mut layout = self.layout.clone();
        if let Some(key) = &self.layout_key {
            layout.change_focus_key = key.clone();
        }
        layout
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
