//! Transport message framing around data pages.
//!
//! Inbound broadcast and acknowledged messages carry a data page and,
//! with extended data enabled, the channel identifier of the transmitting
//! device. Outbound commands are sent as extended acknowledged messages
//! addressed by channel identifier.

use thiserror::Error;
use zerocopy::{FromBytes, byteorder::little_endian::U32};

use super::{
    channel::ChannelId,
    page::{PAGE_SIZE, Page},
};

/// Message identifiers.
pub mod id {
    pub const BROADCAST_DATA: u8 = 0x4E;
    pub const ACKNOWLEDGED_DATA: u8 = 0x4F;
    pub const BURST_DATA: u8 = 0x50;
    pub const EXT_BROADCAST_DATA: u8 = 0x5D;
    pub const EXT_ACKNOWLEDGED_DATA: u8 = 0x5E;
    pub const EXT_BURST_DATA: u8 = 0x5F;
}

/// An error parsing an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The message ended before its data page or channel identifier.
    #[error("Message is too short ({0} bytes).")]
    TooShort(usize),
    /// The message does not carry a single data page.
    #[error("Unsupported message identifier ({0:#04X}).")]
    Unsupported(u8),
}

/// A data page received on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inbound {
    pub channel_number: u8,
    pub channel_id: ChannelId,
    pub page: Page,
}

impl Inbound {
    /// Parse a message, beginning with its length byte.
    pub fn parse(r: &[u8]) -> Result<Self, MessageError> {
        let [_, message_id] = take::<2>(r)?;

        match message_id {
            id::BROADCAST_DATA | id::ACKNOWLEDGED_DATA => {
                // Page first, followed by a flag byte and the channel ID.
                #[repr(C)]
                #[derive(FromBytes)]
                struct Flagged {
                    _length: u8,
                    _message_id: u8,
                    channel_number: u8,
                    page: [u8; PAGE_SIZE],
                    _flag: u8,
                    channel_id: U32,
                }

                let Flagged {
                    channel_number,
                    page,
                    channel_id,
                    ..
                } = zerocopy::transmute!(take::<16>(r)?);

                Ok(Self {
                    channel_number,
                    channel_id: ChannelId::new(channel_id.get()),
                    page: Page::new(page),
                })
            }
            id::EXT_BROADCAST_DATA | id::EXT_ACKNOWLEDGED_DATA | id::EXT_BURST_DATA => {
                #[repr(C)]
                #[derive(FromBytes)]
                struct Extended {
                    _length: u8,
                    _message_id: u8,
                    channel_number: u8,
                    channel_id: U32,
                    page: [u8; PAGE_SIZE],
                }

                let Extended {
                    channel_number,
                    channel_id,
                    page,
                    ..
                } = zerocopy::transmute!(take::<15>(r)?);

                Ok(Self {
                    channel_number,
                    channel_id: ChannelId::new(channel_id.get()),
                    page: Page::new(page),
                })
            }
            _ => Err(MessageError::Unsupported(message_id)),
        }
    }
}

/// A data page to send to a device as an extended acknowledged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outbound {
    pub channel_number: u8,
    pub channel_id: ChannelId,
    pub page: Page,
}

impl Outbound {
    /// Length of an encoded message.
    pub const SIZE: usize = 15;

    pub const fn new(channel_number: u8, channel_id: ChannelId, page: Page) -> Self {
        Self {
            channel_number,
            channel_id,
            page,
        }
    }

    /// Encode the message, beginning with the payload length.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut r = [0; Self::SIZE];
        r[0] = (Self::SIZE - 2) as u8;
        r[1] = id::EXT_ACKNOWLEDGED_DATA;
        r[2] = self.channel_number;
        r[3..7].copy_from_slice(&self.channel_id.id().to_le_bytes());
        r[7..].copy_from_slice(self.page.as_array());
        r
    }
}

/// Take an exact number of bytes from the start of a message.
fn take<const N: usize>(r: &[u8]) -> Result<[u8; N], MessageError> {
    Ok(*r.first_chunk().ok_or(MessageError::TooShort(r.len()))?)
}
