//! Geocache trackable identifiers.
//!
//! A trackable identifier is nine characters from the 64-character alphabet
//! `' '..='_'`, each stored as six bits (the character minus `0x20`). The
//! characters are packed big-endian into the seven bytes following the page
//! identifier: four characters in the first three bytes, five in the last
//! four, with the final two bits unused.

use core::fmt;

use super::command::CommandError;

/// Number of characters in a trackable identifier.
pub const LENGTH: usize = 9;

/// A nine-character trackable identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackableId([u8; LENGTH]);

impl TrackableId {
    /// Validate an identifier for programming.
    ///
    /// Lower-case letters are upper-cased, and identifiers shorter than nine
    /// characters are padded with spaces.
    pub fn parse(id: &str) -> Result<Self, CommandError> {
        let count = id.chars().count();
        if count > LENGTH {
            Err(CommandError::IdentifierTooLong(count))?;
        }

        let mut chars = [b' '; LENGTH];
        for (slot, c) in chars.iter_mut().zip(id.chars()) {
            let c = c.to_ascii_uppercase();
            if !(' '..='_').contains(&c) {
                Err(CommandError::UnencodableCharacter(c))?;
            }
            *slot = c as u8;
        }

        Ok(Self(chars))
    }

    /// Decode an identifier from the seven bytes following a page identifier.
    pub fn decode(r: [u8; 7]) -> Self {
        // Each character is a six-bit window, some of which straddle a byte
        // boundary and are read from a rotated little-endian pair.
        let pair = |i: usize| u16::from_le_bytes([r[i], r[i + 1]]);

        let windows = [
            r[0] >> 2,
            (pair(0).rotate_left(4) & 0x3F) as u8,
            (pair(1).rotate_left(2) & 0x3F) as u8,
            r[2] & 0x3F,
            r[3] >> 2,
            (pair(3).rotate_left(4) & 0x3F) as u8,
            (pair(4).rotate_left(2) & 0x3F) as u8,
            r[5] & 0x3F,
            r[6] >> 2,
        ];

        Self(windows.map(|w| w + 0x20))
    }

    /// Encode the identifier into seven bytes, the inverse of
    /// [`TrackableId::decode`].
    pub fn encode(&self) -> [u8; 7] {
        let c = self.0.map(|c| u32::from(c - 0x20));

        let first = (c[0] << 18) | (c[1] << 12) | (c[2] << 6) | c[3];
        let second = (c[4] << 26) | (c[5] << 20) | (c[6] << 14) | (c[7] << 8) | (c[8] << 2);

        let [_, a, b, d] = first.to_be_bytes();
        let [e, f, g, h] = second.to_be_bytes();

        [a, b, d, e, f, g, h]
    }

    /// The identifier, including any space padding.
    pub fn as_str(&self) -> &str {
        // Every character lies in `' '..='_'`, so the bytes are always ASCII.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for TrackableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrackableId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for TrackableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().trim_end())
    }
}
