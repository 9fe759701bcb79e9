use super::*;

#[test]
fn mod_bit_ops_and_contains() {
    let m = Mod::BOLD | Mod::UNDERLINE | Mod::ITALIC;
    assert!(m.contains(Mod::BOLD));
    assert!(m.contains(Mod::UNDERLINE));
    assert!(m.contains(Mod::ITALIC));
    assert!(!m.contains(Mod::REVERSE));
}

#[test]
fn style_builder_sets_fields() {
    let s = Style::default().fg(Color::Rgb(1, 2, 3)).bg(Color::Indexed(8));
    assert_eq!(s.fg, Some(Color::Rgb(1, 2, 3)));
    assert_eq!(s.bg, Some(Color::Indexed(8)));
}

#[test]
fn patch_overrides_only_set_fields() {
    let base = Style::default().fg(Color::RED).bg(Color::BLUE);
    let merged = base.patch(Style::default().fg(Color::GREEN).add_mod(Mod::BOLD));
    assert_eq!(merged.fg, Some(Color::GREEN));
    assert_eq!(merged.bg, Some(Color::BLUE));
    assert!(merged.mods.contains(Mod::BOLD));
}

#[test]
fn parse_color_accepts_names_and_hex() {
    assert_eq!(parse_color("white"), Some(Color::WHITE));
    assert_eq!(parse_color(" Cyan "), Some(Color::CYAN));
    assert_eq!(parse_color("#0a0B0c"), Some(Color::Rgb(10, 11, 12)));
    assert_eq!(parse_color("#123"), None);
    assert_eq!(parse_color("chartreuse"), None);
    assert_eq!(parse_color(""), None);
}
