#![allow(dead_code)]

use chainring::sans::{FromPage, Page};

#[derive(Debug, PartialEq, FromPage)]
enum ThermometerPage {
    #[page(0x00 | 0x80)]
    Reading(Reading),
    #[page(0x02..=0x0F)]
    Programmable(Programmable),
    #[page(0x20)]
    Conditional(Conditional),
}

#[derive(Debug, PartialEq)]
struct Reading {
    centidegrees: i16,
}

impl FromPage for Reading {
    fn from_page(page: &Page) -> Option<Self> {
        let [_, _, _, _, _, _, lo, hi] = page.bytes();
        Some(Self {
            centidegrees: i16::from_le_bytes([lo, hi]),
        })
    }
}

#[derive(Debug, PartialEq)]
struct Programmable {
    index: u8,
}

impl FromPage for Programmable {
    fn from_page(page: &Page) -> Option<Self> {
        Some(Self { index: page.id() })
    }
}

#[derive(Debug, PartialEq)]
struct Conditional;

impl FromPage for Conditional {
    fn from_page(page: &Page) -> Option<Self> {
        (page.bytes()[1] == 1).then_some(Self)
    }
}

fn decode(bytes: [u8; 8]) -> Option<ThermometerPage> {
    ThermometerPage::from_page(&Page::new(bytes))
}

#[test]
fn alternatives_share_variant() {
    let expected = Some(ThermometerPage::Reading(Reading { centidegrees: -250 }));

    assert_eq!(decode([0x00, 0, 0, 0, 0, 0, 0x06, 0xFF]), expected);
    assert_eq!(decode([0x80, 0, 0, 0, 0, 0, 0x06, 0xFF]), expected);
}

#[test]
fn ranges_match_every_identifier() {
    for id in 0x02..=0x0F {
        assert_eq!(
            decode([id, 0, 0, 0, 0, 0, 0, 0]),
            Some(ThermometerPage::Programmable(Programmable { index: id }))
        );
    }
}

#[test]
fn unmatched_identifiers_yield_none() {
    assert_eq!(decode([0x01, 0, 0, 0, 0, 0, 0, 0]), None);
    assert_eq!(decode([0x10, 0, 0, 0, 0, 0, 0, 0]), None);
    assert_eq!(decode([0xFF, 0, 0, 0, 0, 0, 0, 0]), None);
}

#[test]
fn variant_may_decline() {
    assert_eq!(
        decode([0x20, 1, 0, 0, 0, 0, 0, 0]),
        Some(ThermometerPage::Conditional(Conditional))
    );
    assert_eq!(decode([0x20, 0, 0, 0, 0, 0, 0, 0]), None);
}
