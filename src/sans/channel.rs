//! Channel identifiers.

use core::fmt;

/// Channel sharing mode, carried in the transmission type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelSharing {
    Reserved = 0,
    IndependentChannel = 1,
    SharedChannelOneByteAddress = 2,
    SharedChannelTwoByteAddress = 3,
}

/// A 32-bit channel identifier, addressing the broadcast stream of a single
/// device.
///
/// | Bits           | Field                                  |
/// |----------------|----------------------------------------|
/// | 0..16, 28..32  | Device number (20 bits)                |
/// | 16..23         | Device type                            |
/// | 23             | Pairing bit                            |
/// | 24..26         | Transmission type (sharing mode)       |
/// | 26             | Global data pages used                 |
///
/// Every 32-bit value is a valid identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelId(u32);

impl ChannelId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// The 20-bit device number. The upper four bits are taken from the top
    /// nibble of the identifier.
    pub const fn device_number(self) -> u32 {
        (self.0 & 0xFFFF) + ((self.0 >> 12) & 0xF_0000)
    }

    /// The 7-bit device type.
    pub const fn device_type(self) -> u8 {
        ((self.0 >> 16) & 0x7F) as u8
    }

    pub const fn is_pairing_bit_set(self) -> bool {
        self.0 & 0x0080_0000 != 0
    }

    pub const fn transmission_type(self) -> ChannelSharing {
        match (self.0 >> 24) & 0x3 {
            0 => ChannelSharing::Reserved,
            1 => ChannelSharing::IndependentChannel,
            2 => ChannelSharing::SharedChannelOneByteAddress,
            _ => ChannelSharing::SharedChannelTwoByteAddress,
        }
    }

    /// Whether the device transmits global (shared) data pages.
    pub const fn are_global_pages_used(self) -> bool {
        self.0 & 0x0400_0000 != 0
    }
}

impl From<u32> for ChannelId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ChannelId> for u32 {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

impl fmt::Debug for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelId")
            .field("id", &format_args!("{:#010X}", self.0))
            .field("device_number", &self.device_number())
            .field("device_type", &self.device_type())
            .finish()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_type(), self.device_number())
    }
}
