//! Background pages of the legacy sensor profiles.
//!
//! Heart rate monitors and bike speed or cadence sensors interleave
//! identification pages with their measurements. Bit 7 of the page
//! identifier toggles every four pages, so the identifier proper is held in
//! the low seven bits.

use core::time::Duration;

use crate::sans::{Page, page::u24_le};

/// Mask selecting the identifier from a toggled page identifier.
pub const ID_MASK: u8 = 0x7F;

pub const DEFAULT: u8 = 0x00;
pub const OPERATING_TIME: u8 = 0x01;
pub const MANUFACTURER_INFO: u8 = 0x02;
pub const PRODUCT_INFO: u8 = 0x03;

/// Manufacturer identification page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManufacturerInfo {
    pub manufacturer_id: u8,
    /// Upper 16 bits of the serial number; the lower 16 are the device
    /// number.
    pub serial_number: u16,
}

/// Product identification page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductInfo {
    pub hardware_version: u8,
    pub software_version: u8,
    pub model_number: u8,
}

/// A background page common to the legacy profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Background {
    OperatingTime(Duration),
    ManufacturerInfo(ManufacturerInfo),
    ProductInfo(ProductInfo),
}

impl Background {
    /// Decode pages 1 to 3, ignoring the toggle bit.
    pub fn decode(page: &Page) -> Option<Self> {
        let [id, a, b, c, ..] = page.bytes();

        match id & ID_MASK {
            OPERATING_TIME => Some(Self::OperatingTime(Duration::from_secs(
                u64::from(u24_le([a, b, c])) * 2,
            ))),
            MANUFACTURER_INFO => Some(Self::ManufacturerInfo(ManufacturerInfo {
                manufacturer_id: a,
                serial_number: u16::from_le_bytes([b, c]),
            })),
            PRODUCT_INFO => Some(Self::ProductInfo(ProductInfo {
                hardware_version: a,
                software_version: b,
                model_number: c,
            })),
            _ => None,
        }
    }
}

/// Identification gathered from background pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identification {
    pub operating_time: Option<Duration>,
    pub manufacturer_info: Option<ManufacturerInfo>,
    pub product_info: Option<ProductInfo>,
}

impl Identification {
    pub fn apply(&mut self, background: Background) {
        match background {
            Background::OperatingTime(t) => self.operating_time = Some(t),
            Background::ManufacturerInfo(m) => self.manufacturer_info = Some(m),
            Background::ProductInfo(p) => self.product_info = Some(p),
        }
    }
}

/// Whether the page toggle bit is set.
pub fn toggle(page: &Page) -> bool {
    page.id() & !ID_MASK != 0
}
