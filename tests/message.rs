use chainring::sans::{
    ChannelId, Page,
    command::{CommandType, RequestDataPage},
    message::{Inbound, MessageError, Outbound},
};

const PAGE: [u8; 8] = [0x10, 1, 0xFF, 90, 0xE8, 0x03, 200, 0];

#[test]
fn extended_broadcast() {
    let mut message = vec![0x0D, 0x5D, 0x01, 0x01, 0x00, 0x0B, 0x05];
    message.extend_from_slice(&PAGE);

    let inbound = Inbound::parse(&message).unwrap();
    assert_eq!(inbound.channel_number, 1);
    assert_eq!(inbound.channel_id, ChannelId::new(0x050B_0001));
    assert_eq!(inbound.page, Page::new(PAGE));
}

#[test]
fn flagged_broadcast() {
    let mut message = vec![0x0E, 0x4E, 0x00];
    message.extend_from_slice(&PAGE);
    message.extend_from_slice(&[0x80, 0x01, 0x00, 0x0B, 0x05]);

    let inbound = Inbound::parse(&message).unwrap();
    assert_eq!(inbound.channel_number, 0);
    assert_eq!(inbound.channel_id, ChannelId::new(0x050B_0001));
    assert_eq!(inbound.page, Page::new(PAGE));
}

#[test]
fn truncated_messages() {
    assert_eq!(Inbound::parse(&[0x0D]), Err(MessageError::TooShort(1)));

    let mut message = vec![0x0D, 0x5D, 0x01, 0x01, 0x00, 0x0B, 0x05];
    message.extend_from_slice(&PAGE[..4]);
    assert_eq!(Inbound::parse(&message), Err(MessageError::TooShort(11)));
}

#[test]
fn unsupported_message() {
    assert_eq!(
        Inbound::parse(&[0x01, 0x6F, 0x00]),
        Err(MessageError::Unsupported(0x6F))
    );
}

#[test]
fn outbound_is_extended_acknowledged() {
    let request = RequestDataPage {
        slave_serial_number: 0x1234,
        transmission_response: 0x82,
        command_type: CommandType::DataPageFromSlave,
        ..RequestDataPage::new(0x51)
    };
    let outbound = Outbound::new(4, ChannelId::new(0x050B_0001), request.encode());

    assert_eq!(
        outbound.encode(),
        [
            0x0D, 0x5E, 0x04, 0x01, 0x00, 0x0B, 0x05, 0x46, 0x34, 0x12, 0xFF, 0xFF, 0x82, 0x51,
            0x03,
        ]
    );
}
