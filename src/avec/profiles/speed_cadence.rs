//! Bike speed (device type 123) and bike cadence (device type 122) sensors.
//!
//! Both sensors report the time of the last revolution event and a
//! cumulative revolution count on every page, with background pages
//! rotating through the remaining bytes.

use core::time::Duration;

use tartan_bitfield::bitfield;
use zerocopy::{FromBytes, byteorder::little_endian::U16};

use crate::{
    avec::session::Config,
    sans::{FromPage, Page, common::BatteryStatus, rollover::Accumulator},
};

use super::{
    Profile,
    background::{self, Background, Identification},
};

pub const BATTERY_STATUS: u8 = 0x04;
pub const MOTION_AND_SPEED: u8 = 0x05;

/// Battery status background page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battery {
    /// Volts, or NaN.
    pub voltage: f64,
    pub status: BatteryStatus,
}

/// Content of the bytes preceding the measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Detail {
    /// The default page, carrying only the measurement.
    None,
    Background(Background),
    Battery(Battery),
    /// Whether the bicycle is stopped.
    Motion(bool),
}

/// A page from a speed or cadence sensor (identifiers `0x00..=0x05`, with
/// either toggle).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedCadencePage {
    pub toggle: bool,
    pub detail: Detail,
    /// Time of the last event in 1/1024 s.
    pub event_time: u16,
    pub revolutions: u16,
}

impl FromPage for SpeedCadencePage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            id: u8,
            detail: [u8; 3],
            event_time: U16,
            revolutions: U16,
        }

        let Layout {
            id,
            detail,
            event_time,
            revolutions,
        } = zerocopy::transmute!(page.bytes());

        let detail = match id & background::ID_MASK {
            background::DEFAULT => Detail::None,
            BATTERY_STATUS => {
                bitfield! {
                    struct Descriptive(u8) {
                        [0..4] coarse_voltage: u8,
                        [4..7] status: u8,
                    }
                }

                let descriptive = Descriptive(detail[2]);

                Detail::Battery(Battery {
                    voltage: match descriptive.coarse_voltage() {
                        0x0F => f64::NAN,
                        coarse => f64::from(coarse) + f64::from(detail[1]) / 256.0,
                    },
                    status: descriptive.status().into(),
                })
            }
            MOTION_AND_SPEED => Detail::Motion(detail[0] & 0x01 != 0),
            _ => Detail::Background(Background::decode(page)?),
        };

        Some(Self {
            toggle: background::toggle(page),
            detail,
            event_time: event_time.get(),
            revolutions: revolutions.get(),
        })
    }
}

/// Fields changed by a speed or cadence page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Update {
    /// The measurement, carried by every page, and nothing else.
    Measurement,
    /// The measurement and identification.
    Identification,
    Battery,
    Motion,
}

/// Background state shared by speed and cadence sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensor {
    pub identification: Identification,
    pub battery: Option<Battery>,
    pub stopped: Option<bool>,
    pub event_time: Accumulator<u16>,
    pub revolutions: Accumulator<u16>,
}

impl Sensor {
    /// Fold a page into the shared state, returning the deltas of the event
    /// time and revolution count.
    fn apply(&mut self, page: &SpeedCadencePage) -> (Update, u32, u32) {
        let update = match page.detail {
            Detail::None => Update::Measurement,
            Detail::Background(b) => {
                self.identification.apply(b);
                Update::Identification
            }
            Detail::Battery(b) => {
                self.battery = Some(b);
                Update::Battery
            }
            Detail::Motion(stopped) => {
                self.stopped = Some(stopped);
                Update::Motion
            }
        };

        let time = self.event_time.update(page.event_time);
        let revolutions = self.revolutions.update(page.revolutions);

        (update, time, revolutions)
    }

    /// Accumulated event time.
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.event_time.total() as f64 / 1024.0)
    }
}

/// Telemetry of a bike speed sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BikeSpeed {
    pub sensor: Sensor,
    /// Meters per second, or NaN.
    pub speed: f64,
    /// Meters.
    pub accumulated_distance: f64,
}

impl Default for BikeSpeed {
    fn default() -> Self {
        Self {
            sensor: Sensor::default(),
            speed: f64::NAN,
            accumulated_distance: 0.0,
        }
    }
}

impl Profile for BikeSpeed {
    type Page = SpeedCadencePage;
    type Update = Update;

    fn apply(&mut self, page: SpeedCadencePage, config: &Config) -> Option<Update> {
        let (update, time, revolutions) = self.sensor.apply(&page);
        let revolutions = f64::from(revolutions);

        self.accumulated_distance += config.wheel_circumference * revolutions;
        if time != 0 {
            self.speed = config.wheel_circumference * revolutions * 1024.0 / f64::from(time);
        }

        Some(update)
    }
}

/// Telemetry of a bike cadence sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BikeCadence {
    pub sensor: Sensor,
    /// Revolutions per minute, or NaN.
    pub cadence: f64,
}

impl Default for BikeCadence {
    fn default() -> Self {
        Self {
            sensor: Sensor::default(),
            cadence: f64::NAN,
        }
    }
}

impl Profile for BikeCadence {
    type Page = SpeedCadencePage;
    type Update = Update;

    fn apply(&mut self, page: SpeedCadencePage, _: &Config) -> Option<Update> {
        let (update, time, revolutions) = self.sensor.apply(&page);

        if time != 0 {
            self.cadence = 60.0 * f64::from(revolutions) * 1024.0 / f64::from(time);
        }

        Some(update)
    }
}
