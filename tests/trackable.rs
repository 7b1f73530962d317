use chainring::sans::{command::CommandError, trackable::TrackableId};

#[test]
fn blank_identifier_is_all_zero() {
    let id = TrackableId::parse("").unwrap();

    assert_eq!(id.encode(), [0; 7]);
    assert_eq!(TrackableId::decode([0; 7]), id);
    assert_eq!(id.as_str(), "         ");
    assert_eq!(id.to_string(), "");
}

#[test]
fn first_character_in_leading_bits() {
    let id = TrackableId::parse("a").unwrap();

    assert_eq!(id.as_str(), "A        ");
    assert_eq!(id.encode(), [0x84, 0, 0, 0, 0, 0, 0]);
    assert_eq!(TrackableId::decode([0x84, 0, 0, 0, 0, 0, 0]).to_string(), "A");
}

#[test]
fn full_identifier_survives_packing() {
    let id = TrackableId::parse("GC1A2B3C_").unwrap();
    let decoded = TrackableId::decode(id.encode());

    assert_eq!(decoded.as_str(), "GC1A2B3C_");
}

#[test]
fn invalid_identifiers() {
    assert_eq!(
        TrackableId::parse("GC123456789"),
        Err(CommandError::IdentifierTooLong(11))
    );
    assert_eq!(
        TrackableId::parse("GC~1"),
        Err(CommandError::UnencodableCharacter('~'))
    );
}
