//! Data pages shared by all device families.
//!
//! Identifiers `0x43..=0x57` form a vocabulary common to every ANT+ device
//! profile. [`route`] lets a device family claim the pages it owns and falls
//! back to [`CommonPage`] for the rest.

use core::{fmt, time::Duration};

use chrono::{NaiveDate, NaiveDateTime};
use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use zerocopy::{
    FromBytes,
    byteorder::little_endian::{I16, U16, U32},
};

use super::page::{Available, FromPage, Page, percent};

/// Identifiers of the shared data pages.
pub mod id {
    pub const ANT_FS_CLIENT_BEACON: u8 = 0x43;
    pub const ANT_FS_COMMAND_RESPONSE: u8 = 0x44;
    pub const REQUEST_DATA_PAGE: u8 = 0x46;
    pub const COMMAND_STATUS: u8 = 0x47;
    pub const GENERIC_COMMAND: u8 = 0x49;
    pub const OPEN_CHANNEL_COMMAND: u8 = 0x4A;
    pub const MODE_SETTINGS: u8 = 0x4C;
    pub const MULTI_COMPONENT_MANUFACTURER_INFO: u8 = 0x4E;
    pub const MULTI_COMPONENT_PRODUCT_INFO: u8 = 0x4F;
    pub const MANUFACTURER_INFO: u8 = 0x50;
    pub const PRODUCT_INFO: u8 = 0x51;
    pub const BATTERY_STATUS: u8 = 0x52;
    pub const TIME_AND_DATE: u8 = 0x53;
    pub const SUBFIELD_DATA: u8 = 0x54;
    pub const MEMORY_LEVEL: u8 = 0x55;
    pub const PAIRED_DEVICES: u8 = 0x56;
    pub const ERROR_DESCRIPTION: u8 = 0x57;
}

/// Route a page to a device family's page table, falling back to the shared
/// pages.
///
/// Returns `None` for identifiers claimed by neither.
pub fn route<P: FromPage>(page: &Page) -> Option<Either<P, CommonPage>> {
    match P::from_page(page) {
        Some(p) => Some(Left(p)),
        None => CommonPage::from_page(page).map(Right),
    }
}

/// A decoded shared data page.
#[derive(Debug, Clone, PartialEq, FromPage)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommonPage {
    #[page(0x43)]
    AntFsClientBeacon(AntFsClientBeacon),
    #[page(0x44)]
    AntFsCommandResponse(AntFsCommandResponse),
    #[page(0x47)]
    CommandStatus(CommandStatusPage),
    #[page(0x4E)]
    MultiComponentManufacturerInfo(MultiComponentManufacturerInfo),
    #[page(0x4F)]
    MultiComponentProductInfo(MultiComponentProductInfo),
    #[page(0x50)]
    ManufacturerInfo(ManufacturerInfo),
    #[page(0x51)]
    ProductInfo(ProductInfo),
    #[page(0x52)]
    BatteryStatus(BatteryStatusPage),
    #[page(0x53)]
    TimeAndDate(TimeAndDate),
    #[page(0x54)]
    SubfieldData(SubfieldData),
    #[page(0x55)]
    MemoryLevel(MemoryLevel),
    #[page(0x56)]
    PairedDevice(PairedDevice),
    #[page(0x57)]
    ErrorDescription(ErrorDescription),
}

/// ANT-FS client beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AntFsClientBeacon {
    pub status_1: u8,
    pub status_2: u8,
    pub authentication_type: u8,
    /// Device descriptor, or host serial number while in a session.
    pub descriptor: u32,
}

impl FromPage for AntFsClientBeacon {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            status_1: u8,
            status_2: u8,
            authentication_type: u8,
            descriptor: U32,
        }

        let Layout {
            status_1,
            status_2,
            authentication_type,
            descriptor,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            status_1,
            status_2,
            authentication_type,
            descriptor: descriptor.get(),
        })
    }
}

/// ANT-FS command response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AntFsCommandResponse {
    pub response_id: u8,
    pub parameters: [u8; 6],
}

impl FromPage for AntFsCommandResponse {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            response_id: u8,
            parameters: [u8; 6],
        }

        let Layout {
            response_id,
            parameters,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            response_id,
            parameters,
        })
    }
}

/// Outcome of the last command received by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandStatus {
    Pass,
    Fail,
    NotSupported,
    Rejected,
    Pending,
    /// No command has been received.
    Uninitialized,
    Reserved(u8),
}

impl From<u8> for CommandStatus {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Pass,
            1 => Self::Fail,
            2 => Self::NotSupported,
            3 => Self::Rejected,
            4 => Self::Pending,
            0xFF => Self::Uninitialized,
            v => Self::Reserved(v),
        }
    }
}

/// Command status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandStatusPage {
    /// Identifier of the last command page received.
    pub last_command: u8,
    pub sequence_number: u8,
    pub status: CommandStatus,
    pub response_data: u32,
}

impl FromPage for CommandStatusPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            last_command: u8,
            sequence_number: u8,
            status: u8,
            response_data: U32,
        }

        let Layout {
            last_command,
            sequence_number,
            status,
            response_data,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            last_command,
            sequence_number,
            status: status.into(),
            response_data: response_data.get(),
        })
    }
}

/// Identification of one component of a multi-component system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    /// Number of components in the system.
    pub count: u8,
    /// Identifier of the reporting component.
    pub id: u8,
}

impl From<u8> for Component {
    fn from(r: u8) -> Self {
        bitfield! {
            struct ComponentByte(u8) {
                [0..4] count: u8,
                [4..8] id: u8,
            }
        }

        let byte = ComponentByte(r);

        Self {
            count: byte.count(),
            id: byte.id(),
        }
    }
}

/// Manufacturer information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManufacturerInfo {
    pub hardware_revision: u8,
    pub manufacturer_id: u16,
    pub model_number: u16,
}

impl FromPage for ManufacturerInfo {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: [u8; 2],
            hardware_revision: u8,
            manufacturer_id: U16,
            model_number: U16,
        }

        let Layout {
            hardware_revision,
            manufacturer_id,
            model_number,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            hardware_revision,
            manufacturer_id: manufacturer_id.get(),
            model_number: model_number.get(),
        })
    }
}

/// Manufacturer information reported by one component of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiComponentManufacturerInfo {
    pub component: Component,
    pub info: ManufacturerInfo,
}

impl FromPage for MultiComponentManufacturerInfo {
    fn from_page(page: &Page) -> Option<Self> {
        Some(Self {
            component: page.as_array()[2].into(),
            info: ManufacturerInfo::from_page(page)?,
        })
    }
}

/// Software revision as a main and optional supplemental revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoftwareRevision {
    pub main: u8,
    pub supplemental: Option<u8>,
}

impl SoftwareRevision {
    /// The revision as a decimal version number.
    ///
    /// With a supplemental revision, main `12` and supplemental `34` read as
    /// `1.234`. Without, main `12` reads as `1.2`.
    pub fn version(&self) -> f64 {
        match self.supplemental {
            Some(s) => (f64::from(self.main) * 100.0 + f64::from(s)) / 1000.0,
            None => f64::from(self.main) / 10.0,
        }
    }
}

impl fmt::Display for SoftwareRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.version())
    }
}

/// Product information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductInfo {
    pub software_revision: SoftwareRevision,
    pub serial_number: Option<u32>,
}

impl FromPage for ProductInfo {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: u8,
            supplemental: u8,
            main: u8,
            serial_number: U32,
        }

        let Layout {
            supplemental,
            main,
            serial_number,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            software_revision: SoftwareRevision {
                main,
                supplemental: supplemental.available(),
            },
            serial_number: serial_number.get().available(),
        })
    }
}

/// Product information reported by one component of a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiComponentProductInfo {
    pub component: Component,
    pub info: ProductInfo,
}

impl FromPage for MultiComponentProductInfo {
    fn from_page(page: &Page) -> Option<Self> {
        Some(Self {
            component: page.as_array()[1].into(),
            info: ProductInfo::from_page(page)?,
        })
    }
}

/// Battery condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatteryStatus {
    Unknown,
    New,
    Good,
    Ok,
    Low,
    Critical,
    Reserved,
    Invalid,
}

impl From<u8> for BatteryStatus {
    fn from(v: u8) -> Self {
        match v & 0x07 {
            0 => Self::Unknown,
            1 => Self::New,
            2 => Self::Good,
            3 => Self::Ok,
            4 => Self::Low,
            5 => Self::Critical,
            6 => Self::Reserved,
            _ => Self::Invalid,
        }
    }
}

/// Battery status page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryStatusPage {
    pub number_of_batteries: u8,
    pub identifier: u8,
    pub cumulative_operating_time: Duration,
    /// Battery voltage in volts, or NaN if unavailable.
    pub voltage: f64,
    pub status: BatteryStatus,
}

impl FromPage for BatteryStatusPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: u8,
            identifier: u8,
            operating_time: [u8; 3],
            fractional_voltage: u8,
            descriptive: u8,
        }

        let Layout {
            identifier,
            operating_time,
            fractional_voltage,
            descriptive,
            ..
        } = zerocopy::transmute!(page.bytes());

        bitfield! {
            struct Descriptive(u8) {
                [0..4] coarse_voltage: u8,
                [4..7] status: u8,
                [7] two_second_resolution,
            }
        }

        let descriptive = Descriptive(descriptive);

        let (number_of_batteries, identifier) = match identifier.available() {
            Some(b) => {
                let component = Component::from(b);
                (component.count, component.id)
            }
            None => (1, 0),
        };

        let resolution = if descriptive.two_second_resolution() {
            2
        } else {
            16
        };
        let ticks = u64::from(super::page::u24_le(operating_time));

        let voltage = match descriptive.coarse_voltage() {
            0x0F => f64::NAN,
            coarse => f64::from(coarse) + f64::from(fractional_voltage) / 256.0,
        };

        Some(Self {
            number_of_batteries,
            identifier,
            cumulative_operating_time: Duration::from_secs(ticks * resolution),
            voltage,
            status: descriptive.status().into(),
        })
    }
}

/// Time and date page, in UTC. The day of week is redundant and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeAndDate(pub NaiveDateTime);

impl FromPage for TimeAndDate {
    fn from_page(page: &Page) -> Option<Self> {
        let [_, _, second, minute, hour, day, month, year] = page.bytes();

        let date = NaiveDate::from_ymd_opt(
            2000 + i32::from(year),
            u32::from(month),
            u32::from(day & 0x1F),
        )?;
        let time = date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))?;

        Some(Self(time))
    }
}

/// Quantity carried by a subfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubPage {
    /// Degrees Celsius.
    Temperature,
    /// Kilopascals.
    BarometricPressure,
    /// Percent relative humidity.
    Humidity,
    /// Meters per second.
    WindSpeed,
    /// Degrees.
    WindDirection,
    ChargingCycles,
    /// Degrees Celsius.
    MinimumOperatingTemperature,
    /// Degrees Celsius.
    MaximumOperatingTemperature,
    Invalid,
}

impl From<u8> for SubPage {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Temperature,
            2 => Self::BarometricPressure,
            3 => Self::Humidity,
            4 => Self::WindSpeed,
            5 => Self::WindDirection,
            6 => Self::ChargingCycles,
            7 => Self::MinimumOperatingTemperature,
            8 => Self::MaximumOperatingTemperature,
            _ => Self::Invalid,
        }
    }
}

impl SubPage {
    /// Scale a raw subfield into the subpage's unit. Invalid subpages yield
    /// NaN.
    pub fn scale(self, raw: i16) -> f64 {
        let unsigned = f64::from(raw as u16);

        match self {
            Self::Temperature => f64::from(raw) * 0.01,
            Self::BarometricPressure => unsigned * 0.01,
            Self::Humidity => f64::from(raw) / 100.0,
            Self::WindSpeed => unsigned * 0.01,
            Self::WindDirection => f64::from(raw) / 20.0,
            Self::ChargingCycles => unsigned,
            Self::MinimumOperatingTemperature => f64::from(raw) / 100.0,
            Self::MaximumOperatingTemperature => f64::from(raw) / 100.0,
            Self::Invalid => f64::NAN,
        }
    }
}

/// Subfield (environmental) data page, carrying two independent subfields.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubfieldData {
    pub subpage_1: SubPage,
    pub value_1: f64,
    pub subpage_2: SubPage,
    pub value_2: f64,
}

impl FromPage for SubfieldData {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: u8,
            subpage_1: u8,
            subpage_2: u8,
            value_1: I16,
            value_2: I16,
        }

        let Layout {
            subpage_1,
            subpage_2,
            value_1,
            value_2,
            ..
        } = zerocopy::transmute!(page.bytes());

        let subpage_1 = SubPage::from(subpage_1);
        let subpage_2 = SubPage::from(subpage_2);

        Some(Self {
            subpage_1,
            value_1: subpage_1.scale(value_1.get()),
            subpage_2,
            value_2: subpage_2.scale(value_2.get()),
        })
    }
}

/// Unit of a memory size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemorySizeUnit {
    Bits,
    Kilobits,
    Megabits,
    Terabits,
    Bytes,
    Kilobytes,
    Megabytes,
    Terabytes,
}

impl From<u8> for MemorySizeUnit {
    fn from(v: u8) -> Self {
        match v & 0x83 {
            0x00 => Self::Bits,
            0x01 => Self::Kilobits,
            0x02 => Self::Megabits,
            0x03 => Self::Terabits,
            0x80 => Self::Bytes,
            0x81 => Self::Kilobytes,
            0x82 => Self::Megabytes,
            _ => Self::Terabytes,
        }
    }
}

/// Memory level page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryLevel {
    /// Percent of memory used, or NaN if unavailable.
    pub percent_used: f64,
    /// Total memory size in `total_size_unit`, or NaN if unavailable.
    pub total_size: f64,
    pub total_size_unit: MemorySizeUnit,
}

impl FromPage for MemoryLevel {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: [u8; 3],
            percent_used: u8,
            total_size: U16,
            unit: u8,
        }

        let Layout {
            percent_used,
            total_size,
            unit,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            percent_used: percent(percent_used),
            total_size: match total_size.get().available() {
                Some(size) => f64::from(size) * 0.1,
                None => f64::NAN,
            },
            total_size_unit: unit.into(),
        })
    }
}

/// State of a display's channel to a paired peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelState {
    Closed,
    Searching,
    Synchronized,
    Reserved,
}

impl From<u8> for ChannelState {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Closed,
            1 => Self::Searching,
            2 => Self::Synchronized,
            _ => Self::Reserved,
        }
    }
}

/// Network key used on a paired peripheral's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetworkKey {
    Public,
    Private,
    AntPlusManaged,
    AntFs,
    Reserved,
}

impl From<u8> for NetworkKey {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Public,
            1 => Self::Private,
            2 => Self::AntPlusManaged,
            3 => Self::AntFs,
            _ => Self::Reserved,
        }
    }
}

/// One entry of a device's paired-peripherals list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairedDevice {
    pub index: u8,
    pub connected_devices: u8,
    pub is_paired: bool,
    pub channel_state: ChannelState,
    pub network_key: NetworkKey,
    /// Channel identifier of the peripheral.
    pub peripheral_id: u32,
}

impl FromPage for PairedDevice {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            index: u8,
            connected_devices: u8,
            status: u8,
            peripheral_id: U32,
        }

        let Layout {
            index,
            connected_devices,
            status,
            peripheral_id,
            ..
        } = zerocopy::transmute!(page.bytes());

        bitfield! {
            struct Status(u8) {
                [0..3] network_key: u8,
                [3..6] channel_state: u8,
                [7] is_paired,
            }
        }

        let status = Status(status);

        Some(Self {
            index,
            connected_devices,
            is_paired: status.is_paired(),
            channel_state: status.channel_state().into(),
            network_key: status.network_key().into(),
            peripheral_id: peripheral_id.get(),
        })
    }
}

/// Severity of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorLevel {
    Unknown,
    Warning,
    Critical,
    Reserved,
}

impl From<u8> for ErrorLevel {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::Warning,
            2 => Self::Critical,
            3 => Self::Reserved,
            _ => Self::Unknown,
        }
    }
}

/// Error description page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorDescription {
    pub system_component: u8,
    pub level: ErrorLevel,
    pub profile_error_code: u8,
    pub manufacturer_error_code: u32,
}

impl FromPage for ErrorDescription {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: u8,
            system: u8,
            profile_error_code: u8,
            manufacturer_error_code: U32,
        }

        let Layout {
            system,
            profile_error_code,
            manufacturer_error_code,
            ..
        } = zerocopy::transmute!(page.bytes());

        bitfield! {
            struct System(u8) {
                [0..4] component: u8,
                [6..8] level: u8,
            }
        }

        let system = System(system);

        Some(Self {
            system_component: system.component(),
            level: system.level().into(),
            profile_error_code,
            manufacturer_error_code: manufacturer_error_code.get(),
        })
    }
}
