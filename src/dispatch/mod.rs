//! The dispatch core: widget registries, focus, listeners, the redraw pipeline and the event
//! loop.
//!
//! Everything runs on one thread. A record is fully handled, including any redraw it causes,
//! before the next one is looked at.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::config::{Config, LogLocation};
use crate::core::event::{KeyRecord, MouseEvent, MouseEventKind};
use crate::core::geom::Rect;
use crate::core::style::Color;
use crate::error::{Error, Result};
use crate::input::{Input, InputSource, KeyDecoder, MouseFrame, MouseParser};
use crate::layout::{Compositor, LayoutOptions};
use crate::logging::LoggingGuard;
use crate::page::{ContentPage, PageHandle, Row};
use crate::render::{Backend, FrameBuffer, Painter, Screen};

pub mod focus;
pub mod notify;
pub mod popup;
pub mod widget;

pub use focus::FocusStack;
pub use notify::{Notification, NotificationQueue};
pub use popup::{LogPopup, OnceHook, PopupOutcome, LOG_POPUP_ID};
pub use widget::{EventResult, Registry, Widget, WidgetId, WidgetKind};

pub type KeyListener = Box<dyn FnMut(&KeyRecord, &mut dyn Widget) -> EventResult>;
pub type MouseListener = Box<dyn FnMut(&MouseEvent, &mut dyn Widget) -> EventResult>;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct Dispatcher<W: Write> {
    config: Config,
    screen: Screen<W>,
    compositor: Compositor,
    registry: Registry,
    focus_stack: FocusStack,
    key_listeners: FxHashMap<WidgetId, KeyListener>,
    mouse_listeners: FxHashMap<WidgetId, MouseListener>,
    hooks: FxHashMap<WidgetId, OnceHook>,
    notifications: NotificationQueue,
    log_page: PageHandle,
    decoder: KeyDecoder,
    mouse: MouseParser,
    log_rx: Option<Receiver<String>>,
    resize_flag: Option<Arc<AtomicBool>>,
    poll_interval: Duration,
    exit_requested: bool,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(config: Config, screen: Screen<W>) -> Self {
        let log_page = ContentPage::with_max_rows(config.log_page_size).into_handle();
        let compositor = Compositor::new(config.layout_options());
        let mut dispatcher = Self {
            config,
            screen,
            compositor,
            registry: Registry::new(),
            focus_stack: FocusStack::new(),
            key_listeners: FxHashMap::default(),
            mouse_listeners: FxHashMap::default(),
            hooks: FxHashMap::default(),
            notifications: NotificationQueue::default(),
            log_page,
            decoder: KeyDecoder::new(),
            mouse: MouseParser::new(),
            log_rx: None,
            resize_flag: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            exit_requested: false,
        };
        dispatcher.bind_log_page();
        dispatcher
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> &Screen<W> {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen<W> {
        &mut self.screen
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn focus_stack(&self) -> &FocusStack {
        &self.focus_stack
    }

    pub fn log_page(&self) -> PageHandle {
        self.log_page.clone()
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    /// Shows lines from `logging::init`'s tee in the log page. Ignored unless
    /// `Config::intercept_tracing` is set; returns whether the receiver was kept.
    pub fn intercept_tracing(&mut self, rx: Receiver<String>) -> bool {
        if !self.config.intercept_tracing {
            tracing::warn!("tracing interception is disabled in the config");
            return false;
        }
        self.log_rx = Some(rx);
        true
    }

    /// Takes the tee receiver out of `guard`, if interception is on.
    pub fn attach_logging(&mut self, guard: &mut LoggingGuard) -> bool {
        match guard.take_log_rx() {
            Some(rx) => self.intercept_tracing(rx),
            None => false,
        }
    }

    /// Flag raised by a SIGWINCH handler; checked by the event loop.
    pub fn set_resize_flag(&mut self, flag: Arc<AtomicBool>) {
        self.resize_flag = Some(flag);
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    // ---- pages and layout ----

    pub fn set_page(&mut self, page: PageHandle, index: usize) -> Result<()> {
        self.compositor.set_page(page, index)?;
        self.refresh()
    }

    pub fn set_pages(&mut self, pages: Vec<PageHandle>) -> Result<()> {
        self.compositor.set_pages(pages)?;
        self.bind_log_page();
        self.refresh()
    }

    /// Binds the host's main page to the first pane.
    pub fn set_home_page(&mut self, page: PageHandle) -> Result<()> {
        self.set_page(page, 0)
    }

    pub fn page(&self, index: usize) -> Option<PageHandle> {
        self.compositor.page(index)
    }

    pub fn layout_options(&self) -> &LayoutOptions {
        self.compositor.options()
    }

    /// Replaces the layout. Panes are rebuilt and the whole screen is repainted.
    pub fn set_layout_options(&mut self, options: LayoutOptions) -> Result<()> {
        self.compositor.set_options(options);
        self.bind_log_page();
        self.screen.invalidate();
        self.refresh()
    }

    pub fn increase_ratio(&mut self, step: f32) -> Result<()> {
        let ratio = self.compositor.increase_ratio(step);
        self.notifications.push(Notification::LayoutRatioChanged(ratio));
        self.refresh()
    }

    pub fn decrease_ratio(&mut self, step: f32) -> Result<()> {
        let ratio = self.compositor.decrease_ratio(step);
        self.notifications.push(Notification::LayoutRatioChanged(ratio));
        self.refresh()
    }

    fn bind_log_page(&mut self) {
        let LogLocation::Pane(index) = self.config.log_location else {
            return;
        };
        if let Err(err) = self.compositor.set_page(self.log_page.clone(), index) {
            tracing::warn!(error = %err, "log page only available as popup");
        }
    }

    // ---- registries ----

    pub fn register_control(&mut self, widget: Box<dyn Widget>) -> Option<Box<dyn Widget>> {
        self.registry.register(WidgetKind::Control, widget)
    }

    pub fn unregister_control(&mut self, id: &str) -> Option<Box<dyn Widget>> {
        self.registry.unregister(WidgetKind::Control, id)
    }

    pub fn register_popup(&mut self, widget: Box<dyn Widget>) -> Option<Box<dyn Widget>> {
        self.registry.register(WidgetKind::Popup, widget)
    }

    /// Removes a popup without restoring focus or running its hook.
    pub fn unregister_popup(&mut self, id: &str) -> Option<Box<dyn Widget>> {
        self.hooks.remove(id);
        self.registry.unregister(WidgetKind::Popup, id)
    }

    /// A registered widget as its concrete type.
    pub fn widget_mut<T: Widget>(&mut self, id: &str) -> Option<&mut T> {
        self.registry.get_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn is_focused(&self, id: &str) -> bool {
        self.registry.get(id).is_some_and(|w| w.is_focused())
    }

    pub fn focused_ids(&self) -> Vec<WidgetId> {
        self.registry.focused_ids()
    }

    pub fn set_key_listener(
        &mut self,
        id: &str,
        listener: impl FnMut(&KeyRecord, &mut dyn Widget) -> EventResult + 'static,
    ) {
        self.key_listeners.insert(id.into(), Box::new(listener));
    }

    pub fn remove_key_listener(&mut self, id: &str) {
        self.key_listeners.remove(id);
    }

    pub fn set_mouse_listener(
        &mut self,
        id: &str,
        listener: impl FnMut(&MouseEvent, &mut dyn Widget) -> EventResult + 'static,
    ) {
        self.mouse_listeners.insert(id.into(), Box::new(listener));
    }

    pub fn remove_mouse_listener(&mut self, id: &str) {
        self.mouse_listeners.remove(id);
    }

    /// Unfocuses every registered widget except `id`, remembering each one in a new focus frame
    /// for [`Dispatcher::restore_focus_in_widgets`].
    pub fn unfocus_other_widgets(&mut self, id: &str) {
        self.focus_stack.open_frame();
        for widget in self.registry.iter_mut() {
            if widget.id() != id && widget.is_focused() {
                widget.unfocus();
                self.focus_stack.push(widget.id().into());
            }
        }
    }

    /// Refocuses the widgets remembered by the latest [`Dispatcher::unfocus_other_widgets`] that
    /// are still registered, in the order they were unfocused.
    pub fn restore_focus_in_widgets(&mut self) {
        for id in self.focus_stack.take() {
            if let Some(widget) = self.registry.get_mut(&id) {
                widget.focus();
            }
        }
    }

    /// Registers `popup`, moves focus onto it and redraws. `hook` runs once when the popup
    /// closes.
    pub fn show_popup(&mut self, popup: Box<dyn Widget>, hook: Option<OnceHook>) -> Result<()> {
        let id = WidgetId::from(popup.id());
        self.register_popup(popup);
        match hook {
            Some(hook) => {
                self.hooks.insert(id.clone(), hook);
            }
            None => {
                self.hooks.remove(&id);
            }
        }
        self.unfocus_other_widgets(&id);
        if let Some(widget) = self.registry.get_mut(&id) {
            widget.focus();
        }
        self.refresh()
    }

    /// Closes the popup `id` as cancelled. Unknown ids are ignored.
    pub fn hide_popup(&mut self, id: &str) -> Result<Option<Box<dyn Widget>>> {
        let widget = self.close_popup(id, PopupOutcome::Cancelled);
        self.refresh()?;
        Ok(widget)
    }

    fn close_popup(&mut self, id: &str, outcome: PopupOutcome) -> Option<Box<dyn Widget>> {
        let widget = self.registry.unregister(WidgetKind::Popup, id)?;
        self.restore_focus_in_widgets();
        if let Some(mut hook) = self.hooks.remove(id) {
            hook.fire(outcome);
        }
        Some(widget)
    }

    pub fn show_log_popup(&mut self) -> Result<()> {
        if !self.registry.contains(LOG_POPUP_ID) {
            let popup = LogPopup::new(self.log_page.clone(), self.screen.area());
            self.set_key_listener(LOG_POPUP_ID, |key, widget| {
                match widget.as_any_mut().downcast_mut::<LogPopup>() {
                    Some(popup) => popup.handle_key(key),
                    None => EventResult::Ignored,
                }
            });
            return self.show_popup(Box::new(popup), None);
        }
        self.refresh()
    }

    fn focus_next_control(&mut self) {
        let ids: Vec<WidgetId> = self
            .registry
            .of_kind(WidgetKind::Control)
            .filter(|w| w.is_visible())
            .map(|w| WidgetId::from(w.id()))
            .collect();
        if ids.is_empty() {
            return;
        }
        let current = ids.iter().position(|id| self.is_focused(id));
        for id in &ids {
            if let Some(widget) = self.registry.get_mut(id) {
                widget.unfocus();
            }
        }
        let next = current.map_or(0, |i| (i + 1) % ids.len());
        if let Some(widget) = self.registry.get_mut(&ids[next]) {
            widget.focus();
        }
        tracing::debug!(id = %ids[next], "focus moved");
    }

    // ---- logging API ----

    pub fn log(&mut self, text: &str) -> Result<()> {
        self.append_log(text, Color::WHITE)
    }

    pub fn warn(&mut self, text: &str) -> Result<()> {
        self.append_log(text, Color::YELLOW)
    }

    pub fn error(&mut self, text: &str) -> Result<()> {
        self.append_log(text, Color::RED)
    }

    pub fn info(&mut self, text: &str) -> Result<()> {
        self.append_log(text, Color::BLUE)
    }

    fn append_log(&mut self, text: &str, color: Color) -> Result<()> {
        self.push_log_rows(text, color);
        self.refresh()
    }

    fn push_log_rows(&mut self, text: &str, color: Color) {
        let mut page = self.log_page.borrow_mut();
        for line in text.lines() {
            page.add_row(Row::colored(line, color));
        }
        if text.is_empty() {
            page.add_row(Row::colored("", color));
        }
        page.reset_scroll();
    }

    /// Moves intercepted tracing lines into the log page. Returns whether any arrived.
    fn drain_tracing(&mut self) -> bool {
        let Some(rx) = &self.log_rx else {
            return false;
        };
        let lines: Vec<String> = rx.try_iter().collect();
        for line in &lines {
            let color = if line.contains("ERROR") {
                Color::RED
            } else if line.contains("WARN") {
                Color::YELLOW
            } else {
                Color::WHITE
            };
            self.push_log_rows(line.trim(), color);
        }
        !lines.is_empty()
    }

    // ---- drawing ----

    /// Resyncs the terminal size, composes layout, controls and popups (in that order) and
    /// flushes the screen once.
    pub fn refresh(&mut self) -> Result<()> {
        match self.screen.sync_size() {
            Ok(Some((w, h))) => self.on_resized(w, h),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "terminal size probe failed"),
        }

        let area = self.screen.area();
        let mut painter = Painter::new();
        self.compositor.draw(&mut painter, area);
        for kind in [WidgetKind::Control, WidgetKind::Popup] {
            for widget in self.registry.of_kind(kind).filter(|w| w.is_visible()) {
                widget.draw(&mut painter);
            }
        }

        let mut frame = FrameBuffer::new(area);
        frame.draw(area, painter.cmds());
        if let Err(err) = self.screen.flush(&frame) {
            tracing::error!(error = %err, "screen flush failed");
            return Err(err.into());
        }
        Ok(())
    }

    /// Applies a terminal size reported by the host (e.g. a crossterm resize event).
    pub fn resize(&mut self, w: u16, h: u16) -> Result<()> {
        if self.screen.resize(w, h) {
            self.on_resized(w, h);
        }
        self.refresh()
    }

    fn on_resized(&mut self, w: u16, h: u16) {
        tracing::debug!(w, h, "terminal resized");
        self.notifications.push(Notification::Resize { w, h });
        let area = Rect::new(0, 0, w, h);
        for widget in self.registry.iter_mut() {
            widget.on_resize(area);
        }
    }

    // ---- input ----

    /// Decodes raw terminal bytes and handles every complete record.
    pub fn handle_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for record in self.decoder.decode(bytes) {
            if self.exit_requested {
                break;
            }
            self.handle_record(record)?;
        }
        Ok(())
    }

    /// Idle processing: pending escape bytes become keys and an unfinished mouse report is
    /// given up.
    pub fn tick(&mut self) -> Result<()> {
        for record in self.decoder.flush() {
            self.handle_record(record)?;
        }
        if self.mouse.expire() {
            self.replay_abandoned()?;
        }
        Ok(())
    }

    pub fn handle_record(&mut self, record: KeyRecord) -> Result<()> {
        if self.exit_requested {
            return Ok(());
        }
        if self.config.enable_mouse {
            let frame = self.mouse.feed(&record);
            self.replay_abandoned()?;
            match frame {
                MouseFrame::Start | MouseFrame::Continue => return Ok(()),
                MouseFrame::Complete(event) => return self.dispatch_mouse(event),
                MouseFrame::Passthrough => {}
            }
        }
        self.dispatch_key(record)
    }

    /// Bytes of an abandoned mouse report go out as the keys they really were.
    fn replay_abandoned(&mut self) -> Result<()> {
        let Some(bytes) = self.mouse.take_abandoned() else {
            return Ok(());
        };
        for record in KeyDecoder::decode_all(&bytes) {
            self.dispatch_key(record)?;
        }
        Ok(())
    }

    fn dispatch_key(&mut self, record: KeyRecord) -> Result<()> {
        if self.exit_requested {
            return Ok(());
        }
        let modal = self.registry.count(WidgetKind::Popup) > 0;

        if !modal && self.compositor.options().change_focus_key.matches(&record) {
            self.compositor.change_layout();
            return self.refresh();
        }
        if !modal && self.config.focus_key.matches(&record) {
            self.focus_next_control();
            return self.refresh();
        }
        if self.config.show_log_key.matches(&record) {
            return self.show_log_popup();
        }
        if record.is_ctrl_c() {
            tracing::debug!("exit requested");
            self.exit_requested = true;
            self.notifications.push(Notification::Exit);
            return Ok(());
        }

        let mut redraw = false;
        for id in self.registry.focused_ids() {
            let Some(listener) = self.key_listeners.get_mut(&id) else {
                continue;
            };
            let Some(widget) = self.registry.get_mut(&id) else {
                continue;
            };
            let result = listener(&record, widget);
            redraw |= self.apply_result(&id, result);
        }

        if self.registry.count(WidgetKind::Popup) == 0 && !modal {
            self.notifications.push(Notification::KeyPressed(record));
        }
        if redraw {
            self.refresh()?;
        }
        Ok(())
    }

    fn dispatch_mouse(&mut self, event: MouseEvent) -> Result<()> {
        let modal = self.registry.count(WidgetKind::Popup) > 0;
        let kind = if modal {
            WidgetKind::Popup
        } else {
            WidgetKind::Control
        };
        let candidates = self.registry.ids(kind);
        let mut redraw = false;

        if event.is_left_press() {
            let hit = candidates.iter().find(|id| {
                self.registry
                    .get(id)
                    .is_some_and(|w| w.is_visible() && w.bounds().contains(event.pos))
            });
            if let Some(hit) = hit {
                for id in &candidates {
                    let Some(widget) = self.registry.get_mut(id) else {
                        continue;
                    };
                    if id == hit {
                        if !widget.is_focused() {
                            widget.focus();
                            redraw = true;
                        }
                    } else if widget.is_focused() {
                        widget.unfocus();
                        redraw = true;
                    }
                }
            }
        }

        for id in &candidates {
            let Some(listener) = self.mouse_listeners.get_mut(id) else {
                continue;
            };
            let Some(widget) = self.registry.get_mut(id) else {
                continue;
            };
            let bounds = widget.bounds();
            if !(widget.is_focused() || bounds.contains(event.pos)) {
                continue;
            }
            let result = listener(&event.translated(bounds), widget);
            redraw |= self.apply_result(id, result);
        }

        if !modal {
            if event.is_wheel() {
                redraw |= self.scroll_pane_at(&event);
            }
            self.notifications.push(Notification::Mouse(event));
        }
        if redraw {
            self.refresh()?;
        }
        Ok(())
    }

    fn scroll_pane_at(&mut self, event: &MouseEvent) -> bool {
        let area = self.screen.area();
        let Some(page) = self
            .compositor
            .pane_at(area, event.pos)
            .and_then(|index| self.compositor.page(index))
        else {
            return false;
        };
        let mut page = page.borrow_mut();
        match event.kind {
            MouseEventKind::WheelUp => page.increase_scroll_index(),
            MouseEventKind::WheelDown => page.decrease_scroll_index(),
            _ => return false,
        }
        true
    }

    /// Returns whether the result calls for a redraw.
    fn apply_result(&mut self, id: &str, result: EventResult) -> bool {
        match result {
            EventResult::Ignored => false,
            EventResult::Consumed => true,
            EventResult::Confirm | EventResult::Cancel => {
                if self.registry.kind_of(id) == Some(WidgetKind::Popup) {
                    let outcome = if result == EventResult::Confirm {
                        PopupOutcome::Confirmed
                    } else {
                        PopupOutcome::Cancelled
                    };
                    self.close_popup(id, outcome);
                }
                true
            }
        }
    }

    // ---- event loop ----

    /// Runs until ctrl+c. Every notification is handed to `handler` in order, together with
    /// the dispatcher so the host can react (log, swap pages, ...). A closed input stream or a
    /// failed write ends the loop with an error.
    pub fn run<S, F>(&mut self, source: &mut S, mut handler: F) -> Result<()>
    where
        S: InputSource,
        F: FnMut(&mut Self, Notification),
    {
        self.refresh()?;
        loop {
            if self.drain_tracing() {
                self.refresh()?;
            }
            while let Some(notification) = self.notifications.pop() {
                handler(self, notification);
            }
            if self.exit_requested {
                return Ok(());
            }
            if let Some(flag) = &self.resize_flag {
                if flag.swap(false, Ordering::Relaxed) {
                    self.refresh()?;
                    continue;
                }
            }

            let input = source.poll(self.poll_interval).map_err(|err| {
                tracing::error!(error = %err, "input read failed");
                err
            })?;
            match input {
                Input::Bytes(bytes) => self.handle_bytes(&bytes)?,
                Input::Idle => self.tick()?,
                Input::Closed => {
                    tracing::error!("input stream closed");
                    return Err(Error::StreamClosed);
                }
            }
        }
    }
}

impl Dispatcher<io::Stdout> {
    /// A dispatcher drawing to stdout, sized from the terminal.
    pub fn stdout(config: Config) -> Result<Self> {
        Ok(Self::new(config, Screen::stdout()?))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "../../tests/unit/dispatch/dispatcher.rs"]
mod tests;
