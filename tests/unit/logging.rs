use super::*;

#[test]
fn line_sender_splits_on_drop() {
    let (tx, rx) = mpsc::channel();
    let make = ChannelMakeWriter { tx };
    {
        let mut writer = make.make_writer();
        writer.write_all(b" INFO host: first\n").unwrap();
        writer.write_all(b"second\n\n").unwrap();
        assert!(rx.try_recv().is_err());
    }
    let lines: Vec<String> = rx.try_iter().collect();
    assert_eq!(lines, vec![" INFO host: first".to_string(), "second".to_string()]);
}

#[test]
fn empty_writer_sends_nothing() {
    let (tx, rx) = mpsc::channel();
    drop(ChannelMakeWriter { tx }.make_writer());
    assert!(rx.try_recv().is_err());
}
