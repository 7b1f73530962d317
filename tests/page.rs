use chainring::sans::{
    Page, PageError,
    page::{Available, PairedPercent, percent},
};

#[test]
fn short_payload_is_rejected() {
    let payload: [u8; 3] = [0x10, 0x01, 0x02];
    assert_eq!(Page::try_from(&payload[..]), Err(PageError::TooShort(3)));
    assert_eq!(Page::try_from(&[0u8; 0][..]), Err(PageError::TooShort(0)));
}

#[test]
fn long_payload_uses_first_eight_bytes() {
    let payload: [u8; 10] = [0x10, 1, 2, 3, 4, 5, 6, 7, 0xAA, 0xBB];
    let page = Page::try_from(&payload[..]).unwrap();

    assert_eq!(page.id(), 0x10);
    assert_eq!(page.bytes(), [0x10, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn sentinels_are_unavailable() {
    assert_eq!(0xFFu8.available(), None);
    assert_eq!(0xFEu8.available(), Some(0xFE));
    assert_eq!(0xFFFFu16.available(), None);
    assert_eq!(0xFFFF_FFFFu32.available(), None);
    assert_eq!(0u32.available(), Some(0));
}

#[test]
fn half_percent_scaling() {
    assert_eq!(percent(0), 0.0);
    assert_eq!(percent(200), 100.0);
    assert_eq!(percent(101), 50.5);
    assert!(percent(0xFF).is_nan());
}

#[test]
fn paired_percent_combined() {
    let p = PairedPercent::decode(100, 0xFE);
    assert!(p.combined);
    assert_eq!(p.left, 50.0);
    assert_eq!(p.right, 50.0);
}

#[test]
fn paired_percent_zero_is_not_combined() {
    let p = PairedPercent::decode(0, 0);
    assert!(!p.combined);
    assert_eq!(p.left, 0.0);
    assert_eq!(p.right, 0.0);
}

#[test]
fn paired_percent_unavailable() {
    let p = PairedPercent::decode(0xFF, 0xFF);
    assert!(!p.combined);
    assert!(p.left.is_nan());
    assert!(p.right.is_nan());

    let p = PairedPercent::decode(0xFF, 0xFE);
    assert!(p.combined);
    assert!(p.left.is_nan());
    assert!(p.right.is_nan());
}
