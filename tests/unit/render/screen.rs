use super::*;
use crate::core::geom::Pos;
use crate::render::painter::Painter;
use crate::render::Backend;

fn frame_with(w: u16, h: u16, texts: &[(u16, &str)]) -> FrameBuffer {
    let mut painter = Painter::new();
    for (y, text) in texts {
        painter.text(Pos::new(0, *y), *text, Style::default());
    }
    let mut frame = FrameBuffer::new(Rect::new(0, 0, w, h));
    frame.draw(frame.area(), painter.cmds());
    frame
}

fn take_output(screen: &mut Screen<Vec<u8>>) -> String {
    let out = String::from_utf8_lossy(screen.writer()).into_owned();
    screen.writer_mut().clear();
    out
}

#[test]
fn first_flush_repaints_everything() {
    let mut screen = Screen::headless(Vec::new(), 4, 3);
    let stats = screen.flush(&frame_with(4, 3, &[(0, "ab")])).unwrap();
    assert!(stats.full_repaint);
    assert_eq!(stats.lines_written, 3);
    let out = take_output(&mut screen);
    assert!(out.contains("\x1b[2J"));
    assert!(out.contains("\x1b[1;1Hab  "));
}

#[test]
fn unchanged_lines_are_not_rewritten() {
    let mut screen = Screen::headless(Vec::new(), 4, 3);
    screen.flush(&frame_with(4, 3, &[(0, "ab")])).unwrap();
    take_output(&mut screen);

    let stats = screen.flush(&frame_with(4, 3, &[(0, "ab")])).unwrap();
    assert_eq!(stats.lines_written, 0);
    assert!(!stats.full_repaint);
    assert!(take_output(&mut screen).is_empty());

    let stats = screen.flush(&frame_with(4, 3, &[(0, "ab"), (2, "zz")])).unwrap();
    assert_eq!(stats.lines_written, 1);
    let out = take_output(&mut screen);
    assert!(out.contains("\x1b[3;1Hzz  "));
    assert!(!out.contains("ab"));
}

#[test]
fn resize_forces_full_repaint() {
    let mut screen = Screen::headless(Vec::new(), 4, 2);
    screen.flush(&frame_with(4, 2, &[])).unwrap();

    assert!(!screen.resize(4, 2));
    assert!(screen.resize(5, 2));
    assert_eq!(screen.area(), Rect::new(0, 0, 5, 2));

    let stats = screen.flush(&frame_with(5, 2, &[])).unwrap();
    assert!(stats.full_repaint);
    assert_eq!(stats.lines_written, 2);
}

#[test]
fn headless_screen_never_reports_size_changes() {
    let mut screen = Screen::headless(Vec::new(), 10, 4);
    assert_eq!(screen.sync_size().unwrap(), None);
    assert_eq!(screen.size(), (10, 4));
}

#[test]
fn probed_screen_reports_size() {
    fn probe() -> io::Result<(u16, u16)> {
        Ok((33, 7))
    }
    let mut screen = Screen::with_probe(Vec::new(), probe).unwrap();
    assert_eq!(screen.size(), (33, 7));
    assert_eq!(screen.sync_size().unwrap(), None);
}

#[test]
fn encode_row_wraps_styled_runs_in_sgr() {
    let mut painter = Painter::new();
    painter.text(Pos::new(1, 0), "hi", Style::default().fg(Color::Indexed(1)));
    let mut frame = FrameBuffer::new(Rect::new(0, 0, 4, 1));
    frame.draw(frame.area(), painter.cmds());

    let line = encode_row(&frame, 0);
    assert_eq!(line, " \x1b[0m\x1b[38;5;1mhi\x1b[0m ");
}

#[test]
fn encode_row_skips_wide_glyph_continuations() {
    let frame = frame_with(3, 1, &[(0, "界")]);
    assert_eq!(encode_row(&frame, 0), "界 ");
}

#[test]
fn color_conversion() {
    assert_eq!(to_crossterm_color(Color::Reset), CColor::Reset);
    assert_eq!(to_crossterm_color(Color::Indexed(7)), CColor::AnsiValue(7));
    assert_eq!(
        to_crossterm_color(Color::Rgb(1, 2, 3)),
        CColor::Rgb { r: 1, g: 2, b: 3 }
    );
}
