//! Fitness equipment (device type 17).
//!
//! The general page describes the session common to every machine; the
//! treadmill, rower and climber pages add machine-specific metrics. The last
//! byte of every page carries the machine's capabilities and state.

use core::time::Duration;

use tartan_bitfield::bitfield;
use zerocopy::{
    FromBytes,
    byteorder::little_endian::{I16, U16},
};

use crate::{
    avec::session::Config,
    sans::{FromPage, Page, page::Available, rollover::Accumulator},
};

use super::Profile;

/// Pages claimed by fitness equipment.
#[derive(Debug, Clone, Copy, PartialEq, FromPage)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessEquipmentPage {
    #[page(0x10)]
    General(GeneralPage),
    #[page(0x11)]
    GeneralSettings(GeneralSettings),
    #[page(0x13)]
    Treadmill(TreadmillPage),
    #[page(0x16)]
    Rower(StrokePage),
    #[page(0x17)]
    Climber(StrokePage),
}

/// Operating state of a machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeState {
    #[default]
    Reserved,
    AsleepOff,
    Ready,
    InUse,
    FinishedPaused,
}

impl From<u8> for FeState {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::AsleepOff,
            2 => Self::Ready,
            3 => Self::InUse,
            4 => Self::FinishedPaused,
            _ => Self::Reserved,
        }
    }
}

/// The trailing byte of every fitness equipment page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// Page-specific capability bits.
    pub capabilities: u8,
    pub state: FeState,
    pub lap_toggle: bool,
}

impl From<u8> for Status {
    fn from(r: u8) -> Self {
        bitfield! {
            struct StatusByte(u8) {
                [0..4] capabilities: u8,
                [4..7] state: u8,
                [7] lap_toggle,
            }
        }

        let byte = StatusByte(r);

        Self {
            capabilities: byte.capabilities(),
            state: byte.state().into(),
            lap_toggle: byte.lap_toggle(),
        }
    }
}

/// Kind of machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipmentType {
    #[default]
    General,
    Treadmill,
    Elliptical,
    Rower,
    Climber,
    NordicSkier,
    Trainer,
    Reserved(u8),
}

impl From<u8> for EquipmentType {
    fn from(v: u8) -> Self {
        match v & 0x1F {
            16 => Self::General,
            19 => Self::Treadmill,
            20 => Self::Elliptical,
            22 => Self::Rower,
            23 => Self::Climber,
            24 => Self::NordicSkier,
            25 => Self::Trainer,
            v => Self::Reserved(v),
        }
    }
}

/// General data page (`0x10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneralPage {
    pub equipment_type: EquipmentType,
    /// Elapsed time in 1/4 s, wrapping at 64 s.
    pub elapsed_time: u8,
    /// Distance in meters, wrapping at 256 m.
    pub distance: u8,
    /// Speed in 1/1000 m/s.
    pub speed: Option<u16>,
    pub heart_rate: Option<u8>,
    pub status: Status,
}

impl GeneralPage {
    /// Capability bit set when distance is transmitted.
    pub const DISTANCE_ENABLED: u8 = 0x04;
}

impl FromPage for GeneralPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            equipment_type: u8,
            elapsed_time: u8,
            distance: u8,
            speed: U16,
            heart_rate: u8,
            status: u8,
        }

        let Layout {
            equipment_type,
            elapsed_time,
            distance,
            speed,
            heart_rate,
            status,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            equipment_type: equipment_type.into(),
            elapsed_time,
            distance,
            speed: speed.get().available(),
            heart_rate: heart_rate.available(),
            status: status.into(),
        })
    }
}

/// General settings page (`0x11`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneralSettings {
    /// Meters, or NaN.
    pub cycle_length: f64,
    /// Percent, or NaN.
    pub incline: f64,
    /// Percent of maximum resistance, or NaN.
    pub resistance: f64,
    pub status: Status,
}

impl FromPage for GeneralSettings {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: [u8; 2],
            cycle_length: u8,
            incline: I16,
            resistance: u8,
            status: u8,
        }

        let Layout {
            cycle_length,
            incline,
            resistance,
            status,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            cycle_length: match cycle_length.available() {
                Some(v) => f64::from(v) * 0.01,
                None => f64::NAN,
            },
            incline: match incline.get() {
                0x7FFF => f64::NAN,
                v => f64::from(v) * 0.01,
            },
            resistance: match resistance.available() {
                Some(v) => f64::from(v) * 0.5,
                None => f64::NAN,
            },
            status: status.into(),
        })
    }
}

/// Treadmill data page (`0x13`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreadmillPage {
    /// Steps per minute.
    pub cadence: Option<u8>,
    /// Descent in 1/10 m, wrapping.
    pub negative_vertical_distance: u8,
    /// Ascent in 1/10 m, wrapping.
    pub positive_vertical_distance: u8,
    pub status: Status,
}

impl FromPage for TreadmillPage {
    fn from_page(page: &Page) -> Option<Self> {
        let [_, _, _, _, cadence, negative, positive, status] = page.bytes();

        Some(Self {
            cadence: cadence.available(),
            negative_vertical_distance: negative,
            positive_vertical_distance: positive,
            status: status.into(),
        })
    }
}

/// Rower (`0x16`) and climber (`0x17`) data pages, which share a layout.
///
/// Rowers count strokes; climbers count stride cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokePage {
    /// Strokes or stride cycles, wrapping.
    pub count: u8,
    /// Per minute.
    pub cadence: Option<u8>,
    /// Watts.
    pub instantaneous_power: Option<u16>,
    pub status: Status,
}

impl StrokePage {
    /// Capability bit set when the stroke or stride count is transmitted.
    pub const TRANSMITS_COUNT: u8 = 0x01;
}

impl FromPage for StrokePage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: [u8; 2],
            count: u8,
            cadence: u8,
            instantaneous_power: U16,
            status: u8,
        }

        let Layout {
            count,
            cadence,
            instantaneous_power,
            status,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            count,
            cadence: cadence.available(),
            instantaneous_power: instantaneous_power.get().available(),
            status: status.into(),
        })
    }
}

/// Treadmill metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Treadmill {
    pub cadence: Option<u8>,
    pub negative_vertical_distance: Accumulator<u8>,
    pub positive_vertical_distance: Accumulator<u8>,
    pub transmits_descent: bool,
    pub transmits_ascent: bool,
}

impl Treadmill {
    /// Accumulated descent in meters.
    pub fn descent(&self) -> f64 {
        self.negative_vertical_distance.total() as f64 * 0.1
    }

    /// Accumulated ascent in meters.
    pub fn ascent(&self) -> f64 {
        self.positive_vertical_distance.total() as f64 * 0.1
    }

    fn apply(&mut self, page: TreadmillPage) {
        self.cadence = page.cadence;
        self.negative_vertical_distance
            .update(page.negative_vertical_distance);
        self.positive_vertical_distance
            .update(page.positive_vertical_distance);
        self.transmits_descent = page.status.capabilities & 0x01 != 0;
        self.transmits_ascent = page.status.capabilities & 0x02 != 0;
    }
}

/// Rower or climber metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strokes {
    /// Accumulated strokes or stride cycles.
    pub count: Accumulator<u8>,
    pub cadence: Option<u8>,
    pub instantaneous_power: Option<u16>,
    pub transmits_count: bool,
}

impl Strokes {
    fn apply(&mut self, page: StrokePage) {
        self.count.update(page.count);
        self.cadence = page.cadence;
        self.instantaneous_power = page.instantaneous_power;
        self.transmits_count = page.status.capabilities & StrokePage::TRANSMITS_COUNT != 0;
    }
}

/// Metrics specific to a kind of machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Equipment {
    /// No machine-specific page has been received.
    #[default]
    General,
    Treadmill(Treadmill),
    Rower(Strokes),
    Climber(Strokes),
}

impl Equipment {
    fn apply_treadmill(&mut self, page: TreadmillPage) {
        let mut treadmill = match *self {
            Self::Treadmill(t) => t,
            _ => Treadmill::default(),
        };
        treadmill.apply(page);
        *self = Self::Treadmill(treadmill);
    }

    fn apply_rower(&mut self, page: StrokePage) {
        let mut strokes = match *self {
            Self::Rower(s) => s,
            _ => Strokes::default(),
        };
        strokes.apply(page);
        *self = Self::Rower(strokes);
    }

    fn apply_climber(&mut self, page: StrokePage) {
        let mut strokes = match *self {
            Self::Climber(s) => s,
            _ => Strokes::default(),
        };
        strokes.apply(page);
        *self = Self::Climber(strokes);
    }
}

/// Fields changed by a fitness equipment page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Update {
    General,
    GeneralSettings,
    Treadmill,
    Rower,
    Climber,
}

/// Telemetry of a fitness equipment machine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessEquipment {
    pub equipment_type: EquipmentType,
    pub state: FeState,
    /// Number of lap toggles seen.
    pub laps: u32,
    lap_toggle: Option<bool>,
    pub elapsed_time: Accumulator<u8>,
    pub distance: Accumulator<u8>,
    pub distance_enabled: bool,
    /// Meters per second, or NaN.
    pub speed: f64,
    pub heart_rate: Option<u8>,
    pub settings: Option<GeneralSettings>,
    pub equipment: Equipment,
}

impl Default for FitnessEquipment {
    fn default() -> Self {
        Self {
            equipment_type: EquipmentType::default(),
            state: FeState::default(),
            laps: 0,
            lap_toggle: None,
            elapsed_time: Accumulator::new(),
            distance: Accumulator::new(),
            distance_enabled: false,
            speed: f64::NAN,
            heart_rate: None,
            settings: None,
            equipment: Equipment::default(),
        }
    }
}

impl FitnessEquipment {
    /// Accumulated elapsed time.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_time.total() * 250)
    }

    /// Accumulated distance in meters.
    pub fn distance_traveled(&self) -> u64 {
        self.distance.total()
    }

    fn apply_status(&mut self, status: Status) {
        self.state = status.state;

        if let Some(last) = self.lap_toggle {
            if last != status.lap_toggle {
                self.laps += 1;
            }
        }
        self.lap_toggle = Some(status.lap_toggle);
    }
}

impl Profile for FitnessEquipment {
    type Page = FitnessEquipmentPage;
    type Update = Update;

    fn apply(&mut self, page: FitnessEquipmentPage, _: &Config) -> Option<Update> {
        let update = match page {
            FitnessEquipmentPage::General(p) => {
                self.apply_status(p.status);
                self.equipment_type = p.equipment_type;
                self.elapsed_time.update(p.elapsed_time);
                self.distance_enabled = p.status.capabilities & GeneralPage::DISTANCE_ENABLED != 0;
                if self.distance_enabled {
                    self.distance.update(p.distance);
                }
                self.speed = match p.speed {
                    Some(v) => f64::from(v) * 0.001,
                    None => f64::NAN,
                };
                self.heart_rate = p.heart_rate;
                Update::General
            }
            FitnessEquipmentPage::GeneralSettings(p) => {
                self.apply_status(p.status);
                self.settings = Some(p);
                Update::GeneralSettings
            }
            FitnessEquipmentPage::Treadmill(p) => {
                self.apply_status(p.status);
                self.equipment.apply_treadmill(p);
                Update::Treadmill
            }
            FitnessEquipmentPage::Rower(p) => {
                self.apply_status(p.status);
                self.equipment.apply_rower(p);
                Update::Rower
            }
            FitnessEquipmentPage::Climber(p) => {
                self.apply_status(p.status);
                self.equipment.apply_climber(p);
                Update::Climber
            }
        };

        Some(update)
    }
}
