use super::*;

#[test]
fn inset_shrinks_rect() {
    let r = Rect::new(0, 0, 10, 5);
    assert_eq!(r.inset(Insets::all(1)), Rect::new(1, 1, 8, 3));
}

#[test]
fn inset_saturates_to_empty() {
    let r = Rect::new(0, 0, 2, 2);
    assert_eq!(r.inset(Insets::all(3)), Rect::new(3, 3, 0, 0));
}

#[test]
fn intersect_returns_overlap() {
    let a = Rect::new(0, 0, 5, 5);
    let b = Rect::new(3, 3, 5, 5);
    assert_eq!(a.intersect(b), Rect::new(3, 3, 2, 2));
}

#[test]
fn intersect_disjoint_is_empty() {
    let a = Rect::new(0, 0, 2, 2);
    let b = Rect::new(5, 5, 2, 2);
    assert!(a.intersect(b).is_empty());
}

#[test]
fn columns_cover_the_whole_width() {
    let cols = Rect::new(0, 0, 80, 24).columns(3);
    assert_eq!(cols.len(), 3);
    assert_eq!(cols[0], Rect::new(0, 0, 26, 24));
    assert_eq!(cols[1], Rect::new(26, 0, 27, 24));
    assert_eq!(cols[2], Rect::new(53, 0, 27, 24));
}

#[test]
fn rows_cover_the_whole_height() {
    let rows = Rect::new(0, 2, 10, 7).rows(2);
    assert_eq!(rows, vec![Rect::new(0, 2, 10, 3), Rect::new(0, 5, 10, 4)]);
}

#[test]
fn centered_clamps_to_parent() {
    let r = Rect::new(0, 0, 10, 4);
    assert_eq!(r.centered(4, 2), Rect::new(3, 1, 4, 2));
    assert_eq!(r.centered(40, 20), r);
}
