use super::*;
use crate::core::geom::Pos;
use crate::dispatch::test_support::Panel;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn dispatcher(config: Config) -> Dispatcher<Vec<u8>> {
    Dispatcher::new(config, Screen::headless(Vec::new(), 80, 24))
}

fn mouse_dispatcher() -> Dispatcher<Vec<u8>> {
    dispatcher(Config {
        enable_mouse: true,
        ..Config::default()
    })
}

fn key(name: &str) -> KeyRecord {
    KeyRecord::new(name, name.as_bytes().to_vec())
}

fn tab() -> KeyRecord {
    KeyRecord::new("tab", *b"\t")
}

fn key_presses(notifications: &[Notification]) -> Vec<String> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::KeyPressed(k) => Some(k.name.to_string()),
            _ => None,
        })
        .collect()
}

fn screen_output(d: &mut Dispatcher<Vec<u8>>) -> String {
    let out = String::from_utf8_lossy(d.screen().writer()).into_owned();
    d.screen_mut().writer_mut().clear();
    out
}

#[test]
fn log_lands_in_its_pane_as_newest_white_row() {
    let mut d = dispatcher(Config {
        log_location: LogLocation::Pane(1),
        ..Config::default()
    });
    d.refresh().unwrap();
    for i in 0..40 {
        d.log(&format!("old {i}")).unwrap();
    }
    d.log_page().borrow_mut().increase_scroll_index();
    d.log("hello").unwrap();

    let page = d.page(1).unwrap();
    let page = page.borrow();
    let last = page.visible_rows().last().unwrap();
    assert_eq!(last.text(), "hello");
    assert_eq!(last.style().fg, Some(Color::WHITE));
    assert_eq!(page.scroll_index(), 0);
    drop(page);
    assert!(screen_output(&mut d).contains("hello"));
}

#[test]
fn log_levels_use_their_colors() {
    let mut d = dispatcher(Config::default());
    d.warn("w").unwrap();
    d.error("e").unwrap();
    d.info("i").unwrap();
    let page = d.log_page();
    let colors: Vec<_> = page.borrow().rows().iter().map(|r| r.style().fg).collect();
    assert_eq!(colors, vec![Some(Color::YELLOW), Some(Color::RED), Some(Color::BLUE)]);
}

#[test]
fn log_pane_past_pane_count_falls_back_to_popup() {
    let d = dispatcher(Config {
        log_location: LogLocation::Pane(3),
        ..Config::default()
    });
    assert!(d.page(0).is_none());
    assert!(d.page(1).is_none());
}

#[test]
fn focus_key_cycles_controls_in_registration_order() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).boxed());
    d.register_control(Panel::new("b", Rect::new(0, 1, 5, 1)).boxed());

    d.handle_record(tab()).unwrap();
    assert_eq!(d.focused_ids(), vec!["a"]);
    d.handle_record(tab()).unwrap();
    assert_eq!(d.focused_ids(), vec!["b"]);
    d.handle_record(tab()).unwrap();
    assert_eq!(d.focused_ids(), vec!["a"]);
    // Consumed by focus handling, never broadcast.
    assert!(key_presses(&d.take_notifications()).is_empty());
}

#[test]
fn cycling_after_unregistering_the_focused_control() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).focused().boxed());
    d.register_control(Panel::new("b", Rect::new(0, 1, 5, 1)).boxed());
    d.unregister_control("a");
    d.handle_record(tab()).unwrap();
    assert_eq!(d.focused_ids(), vec!["b"]);

    d.unregister_control("b");
    d.handle_record(tab()).unwrap();
    assert!(d.focused_ids().is_empty());
}

#[test]
fn popup_steals_and_restores_focus() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).focused().boxed());
    d.register_control(Panel::new("b", Rect::new(0, 1, 5, 1)).boxed());

    d.show_popup(Panel::new("p", Rect::new(10, 5, 20, 5)).boxed(), None)
        .unwrap();
    assert_eq!(d.focused_ids(), vec!["p"]);
    assert_eq!(d.focus_stack().ids(), vec!["a"]);

    let popup = d.hide_popup("p").unwrap().unwrap();
    assert_eq!(popup.id(), "p");
    assert_eq!(d.focused_ids(), vec!["a"]);
    assert!(d.focus_stack().is_empty());
    assert!(d.hide_popup("p").unwrap().is_none());
}

#[test]
fn key_broadcast_only_without_popups() {
    let mut d = dispatcher(Config::default());
    d.handle_record(key("x")).unwrap();
    assert_eq!(key_presses(&d.take_notifications()), vec!["x"]);

    d.register_popup(Panel::new("p", Rect::new(0, 0, 5, 5)).boxed());
    d.handle_record(key("y")).unwrap();
    assert!(key_presses(&d.take_notifications()).is_empty());

    d.unregister_popup("p");
    d.handle_record(key("z")).unwrap();
    assert_eq!(key_presses(&d.take_notifications()), vec!["z"]);
}

#[test]
fn focused_widget_listener_gets_keys() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).focused().boxed());
    d.register_control(Panel::new("b", Rect::new(0, 1, 5, 1)).boxed());
    let seen = Rc::new(RefCell::new(Vec::new()));
    for id in ["a", "b"] {
        let seen = seen.clone();
        d.set_key_listener(id, move |key, widget| {
            seen.borrow_mut().push(format!("{}:{}", widget.id(), key.name));
            EventResult::Consumed
        });
    }

    d.handle_record(key("k")).unwrap();
    assert_eq!(*seen.borrow(), vec!["a:k".to_string()]);

    d.remove_key_listener("a");
    d.handle_record(key("j")).unwrap();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn confirm_closes_popup_and_fires_hook_once() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).focused().boxed());
    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let sink = outcomes.clone();
    d.set_key_listener("p", |key, _| {
        if key.name == "return" {
            EventResult::Confirm
        } else {
            EventResult::Ignored
        }
    });
    d.show_popup(
        Panel::new("p", Rect::new(0, 0, 10, 3)).boxed(),
        Some(OnceHook::new(move |outcome| sink.borrow_mut().push(outcome))),
    )
    .unwrap();

    d.handle_record(KeyRecord::new("return", *b"\r")).unwrap();
    assert!(!d.registry().contains("p"));
    assert_eq!(d.focused_ids(), vec!["a"]);
    assert_eq!(*outcomes.borrow(), vec![PopupOutcome::Confirmed]);

    d.handle_record(KeyRecord::new("return", *b"\r")).unwrap();
    assert_eq!(outcomes.borrow().len(), 1);
}

#[test]
fn hide_popup_reports_cancel() {
    let mut d = dispatcher(Config::default());
    let fired = Rc::new(Cell::new(None));
    let sink = fired.clone();
    d.show_popup(
        Panel::new("p", Rect::new(0, 0, 10, 3)).boxed(),
        Some(OnceHook::new(move |outcome| sink.set(Some(outcome)))),
    )
    .unwrap();
    d.hide_popup("p").unwrap();
    assert_eq!(fired.get(), Some(PopupOutcome::Cancelled));
}

#[test]
fn ctrl_c_requests_exit_and_stops_input() {
    let mut d = dispatcher(Config::default());
    d.handle_bytes(b"a\x03b").unwrap();
    let notifications = d.take_notifications();
    assert_eq!(key_presses(&notifications), vec!["a"]);
    assert_eq!(notifications.last(), Some(&Notification::Exit));
    assert!(d.is_exit_requested());

    d.handle_bytes(b"c").unwrap();
    assert!(d.take_notifications().is_empty());
}

#[test]
fn layout_key_selects_next_pane() {
    let mut d = dispatcher(Config::default());
    assert_eq!(d.compositor().selected(), 0);
    d.handle_record(KeyRecord::new("l", [0x0c]).ctrl()).unwrap();
    assert_eq!(d.compositor().selected(), 1);
    assert!(key_presses(&d.take_notifications()).is_empty());
}

#[test]
fn show_log_key_opens_the_log_popup_and_escape_closes_it() {
    let mut d = dispatcher(Config::default());
    d.handle_record(KeyRecord::new("p", [0x10]).ctrl()).unwrap();
    assert!(d.registry().contains(LOG_POPUP_ID));
    assert!(d.is_focused(LOG_POPUP_ID));

    d.handle_bytes(b"\x1b").unwrap();
    assert!(d.registry().contains(LOG_POPUP_ID));
    d.tick().unwrap();
    assert!(!d.registry().contains(LOG_POPUP_ID));
}

#[test]
fn click_focuses_the_first_control_under_the_pointer() {
    let mut d = mouse_dispatcher();
    d.register_control(Panel::new("a", Rect::new(0, 0, 10, 2)).focused().boxed());
    d.register_control(Panel::new("b", Rect::new(0, 2, 10, 2)).boxed());
    d.register_control(Panel::new("c", Rect::new(0, 2, 10, 2)).boxed());
    let local = Rc::new(Cell::new(None));
    let sink = local.clone();
    d.set_mouse_listener("b", move |event, _| {
        sink.set(Some(event.pos));
        EventResult::Consumed
    });

    // SGR coordinates are 1-based: (4, 4) is cell (3, 3).
    d.handle_bytes(b"\x1b[<0;4;4M").unwrap();
    assert_eq!(d.focused_ids(), vec!["b"]);
    assert_eq!(local.get(), Some(Pos::new(3, 1)));
    let notifications = d.take_notifications();
    assert!(matches!(notifications.as_slice(), [Notification::Mouse(ev)] if ev.pos == Pos::new(3, 3)));
}

#[test]
fn mouse_report_split_across_reads_is_one_event() {
    let mut d = mouse_dispatcher();
    d.handle_bytes(b"\x1b[<0;1").unwrap();
    d.handle_bytes(b"0;5").unwrap();
    d.handle_bytes(b"M").unwrap();
    let notifications = d.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert!(matches!(notifications[0], Notification::Mouse(_)));
}

#[test]
fn mouse_is_off_by_default_so_reports_arrive_as_keys() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 20, 10)).boxed());
    d.handle_bytes(b"\x1b[<0;10;5M").unwrap();
    let notifications = d.take_notifications();
    let [Notification::KeyPressed(record)] = notifications.as_slice() else {
        panic!("expected one key, got {notifications:?}");
    };
    assert_eq!(record.sequence, b"\x1b[<0;10;5M".to_vec());
    assert!(d.focused_ids().is_empty());
}

#[test]
fn clicks_go_to_popups_while_one_is_open() {
    let mut d = mouse_dispatcher();
    d.register_control(Panel::new("a", Rect::new(0, 0, 10, 10)).boxed());
    d.show_popup(Panel::new("p", Rect::new(20, 0, 10, 10)).boxed(), None)
        .unwrap();

    d.handle_bytes(b"\x1b[<0;2;2M").unwrap();
    assert_eq!(d.focused_ids(), vec!["p"]);
    assert!(d.take_notifications().is_empty());
}

#[test]
fn wheel_scrolls_the_pane_under_the_pointer() {
    let mut d = mouse_dispatcher();
    let mut page = ContentPage::new();
    for i in 0..100 {
        page.add_row(format!("{i}").as_str());
    }
    let page = page.into_handle();
    d.set_page(page.clone(), 1).unwrap();

    d.handle_bytes(b"\x1b[<64;50;5M").unwrap();
    d.handle_bytes(b"\x1b[<64;50;5M").unwrap();
    assert_eq!(page.borrow().scroll_index(), 2);
    d.handle_bytes(b"\x1b[<65;50;5M").unwrap();
    assert_eq!(page.borrow().scroll_index(), 1);
}

#[test]
fn abandoned_mouse_bytes_come_back_as_keys() {
    let mut d = mouse_dispatcher();
    d.handle_record(KeyRecord::raw(b"\x1b[<0;1".to_vec())).unwrap();
    assert!(d.take_notifications().is_empty());
    d.handle_record(key("q")).unwrap();

    let notifications = d.take_notifications();
    assert_eq!(notifications.len(), 2);
    let Notification::KeyPressed(first) = &notifications[0] else {
        panic!("expected a key, got {:?}", notifications[0]);
    };
    assert_eq!(first.sequence, b"\x1b[<0;1".to_vec());
    assert_eq!(notifications[1], Notification::KeyPressed(key("q")));
}

#[test]
fn resize_notifies_and_reflows_widgets() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).boxed());
    d.refresh().unwrap();
    screen_output(&mut d);

    d.resize(100, 30).unwrap();
    assert_eq!(d.take_notifications(), vec![Notification::Resize { w: 100, h: 30 }]);
    let panel = d.widget_mut::<Panel>("a").unwrap();
    assert_eq!(panel.resized_to, Some(Rect::new(0, 0, 100, 30)));
    assert!(screen_output(&mut d).contains("\x1b[2J"));

    // Same size again: nothing to report.
    d.resize(100, 30).unwrap();
    assert!(d.take_notifications().is_empty());
}

#[test]
fn ratio_changes_are_notified_and_clamped() {
    let mut d = dispatcher(Config::default());
    d.increase_ratio(0.75).unwrap();
    assert_eq!(
        d.take_notifications(),
        vec![Notification::LayoutRatioChanged(crate::layout::MAX_RATIO)]
    );
}

#[test]
fn set_page_past_pane_count_is_reported() {
    let mut d = dispatcher(Config::default());
    let err = d.set_page(ContentPage::new().into_handle(), 5).unwrap_err();
    assert!(matches!(err, Error::PaneIndex { index: 5, panes: 2 }));
}

#[test]
fn set_layout_options_rebuilds_and_repaints() {
    let mut d = dispatcher(Config {
        log_location: LogLocation::Pane(1),
        ..Config::default()
    });
    d.refresh().unwrap();
    screen_output(&mut d);

    let mut options = d.layout_options().clone();
    options.pane_count = crate::layout::PaneCount::Quad;
    d.set_layout_options(options).unwrap();
    assert_eq!(d.compositor().pane_count(), 4);
    assert!(d.page(1).is_some());
    assert!(screen_output(&mut d).contains("\x1b[2J"));
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
    }
}

#[test]
fn write_failures_surface_as_errors() {
    let mut d = Dispatcher::new(Config::default(), Screen::headless(FailingWriter, 10, 4));
    assert!(matches!(d.log("x"), Err(Error::Io(_))));
}

#[test]
fn closing_a_nested_popup_refocuses_only_the_outer_one() {
    let mut d = dispatcher(Config::default());
    d.register_control(Panel::new("a", Rect::new(0, 0, 5, 1)).focused().boxed());
    let hits = Rc::new(Cell::new(0));
    let sink = hits.clone();
    d.set_key_listener("a", move |_, _| {
        sink.set(sink.get() + 1);
        EventResult::Consumed
    });

    d.show_popup(Panel::new("p1", Rect::new(10, 5, 20, 5)).boxed(), None)
        .unwrap();
    d.show_popup(Panel::new("p2", Rect::new(12, 6, 10, 3)).boxed(), None)
        .unwrap();
    assert_eq!(d.focus_stack().depth(), 2);

    d.hide_popup("p2").unwrap();
    assert_eq!(d.focused_ids(), vec!["p1"]);
    d.handle_record(key("x")).unwrap();
    assert_eq!(hits.get(), 0);

    d.hide_popup("p1").unwrap();
    assert_eq!(d.focused_ids(), vec!["a"]);
    assert!(d.focus_stack().is_empty());
    d.handle_record(key("x")).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn intercepted_tracing_lines_are_colored_by_level() {
    let mut d = dispatcher(Config {
        intercept_tracing: true,
        ..Config::default()
    });
    let (tx, rx) = std::sync::mpsc::channel();
    assert!(d.intercept_tracing(rx));
    tx.send("ERROR host: broken".to_string()).unwrap();
    tx.send(" WARN host: careful ".to_string()).unwrap();
    tx.send(" INFO host: fine".to_string()).unwrap();

    assert!(d.drain_tracing());
    assert!(!d.drain_tracing());
    let page = d.log_page();
    let page = page.borrow();
    let rows: Vec<_> = page.rows().iter().map(|r| (r.text(), r.style().fg)).collect();
    assert_eq!(
        rows,
        vec![
            ("ERROR host: broken".to_string(), Some(Color::RED)),
            ("WARN host: careful".to_string(), Some(Color::YELLOW)),
            ("INFO host: fine".to_string(), Some(Color::WHITE)),
        ]
    );
}

#[test]
fn tracing_receiver_is_ignored_when_interception_is_off() {
    let mut d = dispatcher(Config::default());
    let (tx, rx) = std::sync::mpsc::channel();
    assert!(!d.intercept_tracing(rx));
    tx.send("ERROR host: dropped".to_string()).ok();
    assert!(!d.drain_tracing());
    assert!(d.log_page().borrow().is_empty());
}
