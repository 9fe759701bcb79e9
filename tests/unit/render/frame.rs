use super::*;
use crate::core::style::Color;

#[test]
fn draw_text_clips_wide_glyphs_that_do_not_fit() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 1, 1));
    draw_text(&mut buf, Pos::new(0, 0), "界", Style::default(), None);
    assert_eq!(buf.cell(0, 0).unwrap().symbol, " ");
}

#[test]
fn draw_text_marks_trailing_half_of_wide_glyphs() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 3, 1));
    draw_text(&mut buf, Pos::new(0, 0), "界a", Style::default(), None);
    assert_eq!(buf.cell(0, 0).unwrap().symbol, "界");
    assert_eq!(buf.cell(1, 0).unwrap().symbol, "");
    assert_eq!(buf.cell(2, 0).unwrap().symbol, "a");
    assert_eq!(buf.row_text(0), "界a");
}

#[test]
fn draw_text_respects_clip_rect() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 6, 1));
    draw_text(
        &mut buf,
        Pos::new(0, 0),
        "abcdef",
        Style::default(),
        Some(Rect::new(1, 0, 3, 1)),
    );
    assert_eq!(buf.row_text(0), " bcd  ");
}

#[test]
fn fill_rect_clips_to_buffer_area() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 2, 2));
    buf.cell_mut(0, 0).unwrap().symbol = "A".to_string();
    fill_rect(&mut buf, Rect::new(0, 0, 10, 10), Style::default());
    assert_eq!(buf.cell(0, 0).unwrap().symbol, " ");
}

#[test]
fn style_rect_preserves_existing_symbols() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 1, 1));
    buf.cell_mut(0, 0).unwrap().symbol = "A".to_string();
    let style = Style::default().fg(Color::Indexed(2));
    style_rect(&mut buf, Rect::new(0, 0, 1, 1), style);
    let cell = buf.cell(0, 0).unwrap();
    assert_eq!(cell.symbol, "A");
    assert_eq!(cell.style, style);
}

#[test]
fn lines_write_characters() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 3, 3));
    draw_hline(&mut buf, Pos::new(0, 0), 3, '-', Style::default());
    draw_vline(&mut buf, Pos::new(2, 0), 3, '|', Style::default());
    assert_eq!(buf.row_text(0), "--|");
    assert_eq!(buf.row_text(1), "  |");
    assert_eq!(buf.row_text(2), "  |");
}

#[test]
fn border_uses_kind_glyphs() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 4, 3));
    draw_border(&mut buf, Rect::new(0, 0, 4, 3), Style::default(), BorderKind::Double);
    assert_eq!(buf.row_text(0), "╔══╗");
    assert_eq!(buf.row_text(1), "║  ║");
    assert_eq!(buf.row_text(2), "╚══╝");
}

#[test]
fn backend_draw_replays_commands_in_order() {
    let mut buf = FrameBuffer::new(Rect::new(0, 0, 5, 1));
    let cmds = vec![
        PaintCmd::Text {
            pos: Pos::new(0, 0),
            text: "hello".to_string(),
            style: Style::default(),
            clip: None,
        },
        PaintCmd::Text {
            pos: Pos::new(1, 0),
            text: "EY".to_string(),
            style: Style::default(),
            clip: None,
        },
    ];
    buf.draw(buf.area(), &cmds);
    assert_eq!(buf.row_text(0), "hEYlo");
}

#[test]
fn row_outside_area_is_empty() {
    let buf = FrameBuffer::new(Rect::new(0, 0, 2, 2));
    assert!(buf.row(5).is_empty());
}
