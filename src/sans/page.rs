//! The data page, the atomic unit of ANT+ broadcasts.

use thiserror::Error;

/// Number of bytes in a data page.
pub const PAGE_SIZE: usize = 8;

/// An error constructing a data page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    /// Fewer than eight bytes were supplied.
    #[error("Data page is too short ({0} bytes).")]
    TooShort(usize),
}

/// An immutable 8-byte data page.
///
/// Byte 0 holds the page identifier; the remaining seven bytes are interpreted
/// according to the device family and the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page([u8; PAGE_SIZE]);

impl Page {
    /// Wrap an array of bytes as a page.
    pub const fn new(bytes: [u8; PAGE_SIZE]) -> Self {
        Self(bytes)
    }

    /// The leading page identifier.
    pub const fn id(&self) -> u8 {
        self.0[0]
    }

    /// The raw bytes of the page.
    pub const fn bytes(&self) -> [u8; PAGE_SIZE] {
        self.0
    }

    /// The raw bytes of the page, by reference.
    pub const fn as_array(&self) -> &[u8; PAGE_SIZE] {
        &self.0
    }
}

impl From<[u8; PAGE_SIZE]> for Page {
    fn from(bytes: [u8; PAGE_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Page {
    type Error = PageError;

    /// Take a page from the start of a payload.
    ///
    /// Payloads shorter than a page are rejected without a partial decode.
    /// Bytes beyond the eighth are not part of the page and are ignored.
    fn try_from(payload: &[u8]) -> Result<Self, Self::Error> {
        let Some(bytes) = payload.first_chunk::<PAGE_SIZE>() else {
            Err(PageError::TooShort(payload.len()))?
        };

        Ok(Self(*bytes))
    }
}

/// Derive [`FromPage`] for an enumeration of page layouts.
///
/// Each variant holds a single type implementing [`FromPage`], and carries a
/// `page(..)` attribute with a pattern matching the identifiers it decodes.
/// Identifiers matched by no variant yield `None`.
///
/// ```
/// #[derive(FromPage)]
/// enum SpeedPage {
///     #[page(0x00 | 0x80)]
///     Default(DefaultPage),
///     #[page(0x02..=0x1F)]
///     Programmable(ProgrammablePage),
/// }
/// ```
///
/// The generated implementation names `FromPage` and `Page` unqualified, so
/// both must be in scope.
pub use chainring_derive::FromPage;

/// Decode a typed value from a data page.
pub trait FromPage: Sized {
    /// Decode the page, or return `None` if this type does not claim it.
    fn from_page(page: &Page) -> Option<Self>;
}

/// Mapping of all-ones "not available" markers to `None`.
pub trait Available: Sized {
    /// Return the value unless it holds the "not available" marker.
    fn available(self) -> Option<Self>;
}

macro_rules! available {
    ($($t:ty),*) => {$(
        impl Available for $t {
            fn available(self) -> Option<Self> {
                if self != <$t>::MAX {
                    Some(self)
                } else {
                    None
                }
            }
        }
    )*};
}

available!(u8, u16, u32);

/// Decode a half-percent byte, mapping `0xFF` to NaN.
pub fn percent(raw: u8) -> f64 {
    match raw.available() {
        Some(v) => f64::from(v) * 0.5,
        None => f64::NAN,
    }
}

/// Marker in the right-hand byte of a paired percentage for a combined
/// measurement.
pub const COMBINED: u8 = 0xFE;

/// A left/right pair of half-percent measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairedPercent {
    /// Left value in percent, or NaN if unavailable.
    pub left: f64,
    /// Right value in percent, or NaN if unavailable.
    pub right: f64,
    /// Whether the left byte holds a single combined measurement, reported for
    /// both sides.
    pub combined: bool,
}

impl PairedPercent {
    /// Decode a pair of half-percent bytes.
    ///
    /// `0xFF` in either byte is unavailable. `0xFE` in the right byte marks the
    /// left byte as a combined measurement, which is then reported for both
    /// sides.
    pub fn decode(left: u8, right: u8) -> Self {
        if right == COMBINED {
            let value = percent(left);
            Self {
                left: value,
                right: value,
                combined: true,
            }
        } else {
            Self {
                left: percent(left),
                right: percent(right),
                combined: false,
            }
        }
    }
}

impl Default for PairedPercent {
    fn default() -> Self {
        Self {
            left: f64::NAN,
            right: f64::NAN,
            combined: false,
        }
    }
}

/// Read a 24-bit little-endian integer.
pub(crate) fn u24_le(bytes: [u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}
