//! panekit - pane layout, diffing renderer and input dispatch for ANSI terminals
//!
//! Modules:
//! - core: geometry, styles, key records, mouse events
//! - page: scrollable styled-text pages
//! - render: painter, frame buffer, diffing screen writer
//! - input: key decoder, mouse-report parser, crossterm bridge
//! - layout: layout options and the pane compositor
//! - dispatch: widget registries, focus, listeners, event loop
//! - tui: terminal guard, signals, stdin source
//! - config / error / logging

pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod layout;
pub mod logging;
pub mod page;
pub mod render;
pub mod tui;

pub use config::{Config, LogLocation};
pub use dispatch::{Dispatcher, EventResult, Notification, OnceHook, PopupOutcome, Widget};
pub use error::{Error, Result};
pub use layout::LayoutOptions;
pub use page::{ContentPage, PageHandle, Row, Span};
