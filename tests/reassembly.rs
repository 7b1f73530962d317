use chainring::avec::reassembly::{Outcome, Reassembler};

#[test]
fn fragments_concatenate_in_order() {
    let mut r = Reassembler::new();

    assert_eq!(r.push(2, b"ab"), Outcome::Started);
    assert_eq!(r.push(3, b"cd"), Outcome::Appended);
    assert_eq!(r.push(4, b"ef\0\0"), Outcome::Appended);

    assert_eq!(r.text(), "abcdef");
    assert_eq!(r.range(), Some((2, 4)));
}

#[test]
fn lower_index_restarts() {
    let mut r = Reassembler::new();
    r.push(3, b"cd");
    r.push(4, b"ef");

    assert_eq!(r.push(1, b"xy"), Outcome::Restarted);
    assert_eq!(r.bytes(), b"xy");
    assert_eq!(r.range(), Some((1, 1)));
}

#[test]
fn consumed_index_is_ignored() {
    let mut r = Reassembler::new();
    r.push(2, b"ab");
    r.push(3, b"cd");
    r.push(4, b"ef");

    assert_eq!(r.push(3, b"zz"), Outcome::Duplicate);
    assert!(!Outcome::Duplicate.is_change());
    assert_eq!(r.text(), "abcdef");
}

#[test]
fn gaps_are_appended() {
    let mut r = Reassembler::new();
    r.push(2, b"ab");

    assert_eq!(r.push(5, b"cd"), Outcome::Appended);
    assert_eq!(r.text(), "abcd");
}

#[test]
fn clear_empties() {
    let mut r = Reassembler::new();
    r.push(2, b"ab");
    r.clear();

    assert_eq!(r, Reassembler::Empty);
    assert_eq!(r.range(), None);
    assert_eq!(r.text(), "");
    assert_eq!(r.push(7, b"q"), Outcome::Started);
}

#[test]
fn invalid_text_is_replaced() {
    let mut r = Reassembler::new();
    r.push(2, &[b'o', b'k', 0xFF]);

    assert_eq!(r.text(), "ok\u{FFFD}");
}
