//! Bicycle power sensors (device type 11).
//!
//! Power-only sensors broadcast page `0x10`. Torque sensors add wheel
//! (`0x11`) or crank (`0x12`) torque pages, and crank torque frequency
//! sensors broadcast big-endian page `0x20` alone.

use core::{f64::consts::PI, time::Duration};

use tartan_bitfield::bitfield;
use zerocopy::{
    FromBytes,
    byteorder::{
        big_endian::U16 as U16BE,
        little_endian::{I16, U16},
    },
};

use crate::{
    avec::session::Config,
    sans::{
        FromPage, Page,
        command::{Command, CommandType, RequestDataPage, calibration},
        page::{Available, PairedPercent, percent},
        rollover::Accumulator,
    },
};

use super::Profile;

/// Pages claimed by bicycle power sensors.
#[derive(Debug, Clone, Copy, PartialEq, FromPage)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BicyclePowerPage {
    #[page(0x01)]
    Calibration(Calibration),
    #[page(0x02)]
    CrankParameters(CrankParameters),
    #[page(0x10)]
    PowerOnly(PowerOnlyPage),
    #[page(0x11)]
    WheelTorque(TorquePage),
    #[page(0x12)]
    CrankTorque(TorquePage),
    #[page(0x13)]
    TorqueEffectiveness(TorqueEffectiveness),
    #[page(0x20)]
    CrankTorqueFrequency(CrankTorqueFrequencyPage),
}

/// Calibration page (`0x01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Calibration {
    /// Result of a manual zero calibration.
    Response {
        success: bool,
        /// Auto zero state, if supported.
        auto_zero: Option<bool>,
        data: i16,
    },
    AutoZeroSupport {
        supported: bool,
        enabled: bool,
    },
    /// Crank torque frequency zero offset, in hertz.
    CtfZeroOffset(u16),
    /// A crank torque frequency sensor acknowledged a flash write of the
    /// given defined message identifier.
    CtfAcknowledged(u8),
}

impl FromPage for Calibration {
    fn from_page(page: &Page) -> Option<Self> {
        let r = page.as_array();

        match r[1] {
            calibration::RESPONSE_SUCCESS | calibration::RESPONSE_FAILURE => {
                #[repr(C)]
                #[derive(FromBytes)]
                struct Layout {
                    _page: u8,
                    calibration_id: u8,
                    auto_zero: u8,
                    _reserved: [u8; 3],
                    data: I16,
                }

                let Layout {
                    calibration_id,
                    auto_zero,
                    data,
                    ..
                } = zerocopy::transmute!(page.bytes());

                Some(Self::Response {
                    success: calibration_id == calibration::RESPONSE_SUCCESS,
                    auto_zero: match auto_zero {
                        0 => Some(false),
                        1 => Some(true),
                        _ => None,
                    },
                    data: data.get(),
                })
            }
            calibration::AUTO_ZERO_SUPPORT => {
                bitfield! {
                    struct Support(u8) {
                        [0] supported,
                        [1] enabled,
                    }
                }

                let support = Support(r[2]);

                Some(Self::AutoZeroSupport {
                    supported: support.supported(),
                    enabled: support.enabled(),
                })
            }
            calibration::CTF_DEFINED => match r[2] {
                calibration::CTF_ZERO_OFFSET => {
                    Some(Self::CtfZeroOffset(u16::from_be_bytes([r[6], r[7]])))
                }
                calibration::CTF_ACKNOWLEDGE => Some(Self::CtfAcknowledged(r[3])),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Crank length as reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrankLength {
    Unavailable,
    /// The sensor determines the crank length automatically.
    Auto,
    Millimeters(f64),
}

/// Crank parameters (page `0x02`, subpage `0x01`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrankParameters {
    pub crank_length: CrankLength,
    pub crank_length_status: u8,
    pub software_mismatch: u8,
    pub sensor_availability: u8,
    pub custom_calibration: u8,
    pub capabilities: u8,
}

impl CrankParameters {
    pub const SUBPAGE: u8 = 0x01;
}

impl FromPage for CrankParameters {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            subpage: u8,
            _reserved: [u8; 2],
            crank_length: u8,
            status: u8,
            capabilities: u8,
            _reserved_2: u8,
        }

        let Layout {
            subpage,
            crank_length,
            status,
            capabilities,
            ..
        } = zerocopy::transmute!(page.bytes());

        if subpage != Self::SUBPAGE {
            return None;
        }

        bitfield! {
            struct Status(u8) {
                [0..2] crank_length_status: u8,
                [2..4] software_mismatch: u8,
                [4..6] sensor_availability: u8,
                [6..8] custom_calibration: u8,
            }
        }

        let status = Status(status);

        Some(Self {
            crank_length: match crank_length {
                0xFF => CrankLength::Unavailable,
                0xFE => CrankLength::Auto,
                v => CrankLength::Millimeters(f64::from(v) * 0.5 + 110.0),
            },
            crank_length_status: status.crank_length_status(),
            software_mismatch: status.software_mismatch(),
            sensor_availability: status.sensor_availability(),
            custom_calibration: status.custom_calibration(),
            capabilities,
        })
    }
}

/// Which pedal a pedal power percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PedalContribution {
    Right,
    Unknown,
}

/// Share of power contributed by one pedal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedalPower {
    pub percent: u8,
    pub contribution: PedalContribution,
}

/// Power-only page (`0x10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerOnlyPage {
    pub event_count: u8,
    pub pedal_power: Option<PedalPower>,
    pub instantaneous_cadence: Option<u8>,
    pub accumulated_power: u16,
    pub instantaneous_power: u16,
}

impl FromPage for PowerOnlyPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            event_count: u8,
            pedal_power: u8,
            instantaneous_cadence: u8,
            accumulated_power: U16,
            instantaneous_power: U16,
        }

        let Layout {
            event_count,
            pedal_power,
            instantaneous_cadence,
            accumulated_power,
            instantaneous_power,
            ..
        } = zerocopy::transmute!(page.bytes());

        bitfield! {
            struct Pedal(u8) {
                [0..7] percent: u8,
                [7] is_right,
            }
        }

        let pedal_power = pedal_power.available().map(Pedal).map(|p| PedalPower {
            percent: p.percent(),
            contribution: if p.is_right() {
                PedalContribution::Right
            } else {
                PedalContribution::Unknown
            },
        });

        Some(Self {
            event_count,
            pedal_power,
            instantaneous_cadence: instantaneous_cadence.available(),
            accumulated_power: accumulated_power.get(),
            instantaneous_power: instantaneous_power.get(),
        })
    }
}

/// Wheel or crank torque page (`0x11`, `0x12`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TorquePage {
    pub event_count: u8,
    /// Wheel or crank ticks.
    pub ticks: u8,
    pub instantaneous_cadence: Option<u8>,
    /// Accumulated period in 1/2048 s.
    pub period: u16,
    /// Accumulated torque in 1/32 Nm.
    pub accumulated_torque: u16,
}

impl FromPage for TorquePage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            event_count: u8,
            ticks: u8,
            instantaneous_cadence: u8,
            period: U16,
            accumulated_torque: U16,
        }

        let Layout {
            event_count,
            ticks,
            instantaneous_cadence,
            period,
            accumulated_torque,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            event_count,
            ticks,
            instantaneous_cadence: instantaneous_cadence.available(),
            period: period.get(),
            accumulated_torque: accumulated_torque.get(),
        })
    }
}

/// Torque effectiveness and pedal smoothness (`0x13`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TorqueEffectiveness {
    pub event_count: u8,
    /// Left torque effectiveness in percent, or NaN.
    pub left_torque_effectiveness: f64,
    /// Right torque effectiveness in percent, or NaN.
    pub right_torque_effectiveness: f64,
    pub pedal_smoothness: PairedPercent,
}

impl Default for TorqueEffectiveness {
    fn default() -> Self {
        Self {
            event_count: 0,
            left_torque_effectiveness: f64::NAN,
            right_torque_effectiveness: f64::NAN,
            pedal_smoothness: PairedPercent::default(),
        }
    }
}

impl FromPage for TorqueEffectiveness {
    fn from_page(page: &Page) -> Option<Self> {
        let [_, event_count, left_te, right_te, left_ps, right_ps, _, _] = page.bytes();

        Some(Self {
            event_count,
            left_torque_effectiveness: percent(left_te),
            right_torque_effectiveness: percent(right_te),
            pedal_smoothness: PairedPercent::decode(left_ps, right_ps),
        })
    }
}

/// Crank torque frequency page (`0x20`). All fields are big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrankTorqueFrequencyPage {
    pub event_count: u8,
    /// Slope in 1/10 Nm/Hz.
    pub slope: u16,
    /// Time of the last event in 1/2000 s.
    pub timestamp: u16,
    pub torque_ticks: u16,
}

impl FromPage for CrankTorqueFrequencyPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            event_count: u8,
            slope: U16BE,
            timestamp: U16BE,
            torque_ticks: U16BE,
        }

        let Layout {
            event_count,
            slope,
            timestamp,
            torque_ticks,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            event_count,
            slope: slope.get(),
            timestamp: timestamp.get(),
            torque_ticks: torque_ticks.get(),
        })
    }
}

/// Averages derived from the power-only page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerOnly {
    pub events: Accumulator<u8>,
    pub accumulated_power: Accumulator<u16>,
    /// Average power in watts over the last events, or NaN.
    pub average_power: f64,
    pub pedal_power: Option<PedalPower>,
    pub instantaneous_cadence: Option<u8>,
    pub instantaneous_power: u16,
}

impl Default for PowerOnly {
    fn default() -> Self {
        Self {
            events: Accumulator::new(),
            accumulated_power: Accumulator::new(),
            average_power: f64::NAN,
            pedal_power: None,
            instantaneous_cadence: None,
            instantaneous_power: 0,
        }
    }
}

impl PowerOnly {
    fn apply(&mut self, page: PowerOnlyPage) {
        self.pedal_power = page.pedal_power;
        self.instantaneous_cadence = page.instantaneous_cadence;
        self.instantaneous_power = page.instantaneous_power;

        let events = self.events.update(page.event_count);
        let power = self.accumulated_power.update(page.accumulated_power);

        if events != 0 {
            self.average_power = f64::from(power) / f64::from(events);
        }
    }
}

/// Where a torque sensor is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TorqueLocation {
    Wheel,
    Crank,
}

/// Averages derived from wheel or crank torque pages.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TorqueSensor {
    pub location: TorqueLocation,
    pub events: Accumulator<u8>,
    pub ticks: Accumulator<u8>,
    pub period: Accumulator<u16>,
    pub torque: Accumulator<u16>,
    pub instantaneous_cadence: Option<u8>,
    /// Radians per second.
    pub average_angular_velocity: f64,
    /// Newton meters.
    pub average_torque: f64,
    /// Watts.
    pub average_power: f64,
    /// Kilometers per hour. Wheel sensors only.
    pub average_speed: f64,
    /// Meters. Wheel sensors only.
    pub accumulated_distance: f64,
    /// Revolutions per minute. Crank sensors only.
    pub average_cadence: f64,
}

impl TorqueSensor {
    pub fn new(location: TorqueLocation) -> Self {
        Self {
            location,
            events: Accumulator::new(),
            ticks: Accumulator::new(),
            period: Accumulator::new(),
            torque: Accumulator::new(),
            instantaneous_cadence: None,
            average_angular_velocity: f64::NAN,
            average_torque: f64::NAN,
            average_power: f64::NAN,
            average_speed: f64::NAN,
            accumulated_distance: 0.0,
            average_cadence: f64::NAN,
        }
    }

    fn apply(&mut self, page: TorquePage, wheel_circumference: f64) {
        self.instantaneous_cadence = page.instantaneous_cadence;

        let events = f64::from(self.events.update(page.event_count));
        let ticks = f64::from(self.ticks.update(page.ticks));
        let period = f64::from(self.period.update(page.period)) / 2048.0;
        let torque = f64::from(self.torque.update(page.accumulated_torque));

        if self.location == TorqueLocation::Wheel {
            self.accumulated_distance += wheel_circumference * ticks;
        }

        if events == 0.0 || period == 0.0 {
            return;
        }

        self.average_angular_velocity = 2.0 * PI * events / period;
        self.average_torque = torque / (32.0 * events);
        self.average_power = self.average_torque * self.average_angular_velocity;

        match self.location {
            TorqueLocation::Wheel => {
                self.average_speed = wheel_circumference * events / period * 3.6;
            }
            TorqueLocation::Crank => {
                self.average_cadence = 60.0 * events / period;
            }
        }
    }
}

/// State of a crank torque frequency sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrankTorqueFrequency {
    pub events: Accumulator<u8>,
    pub timestamp: Accumulator<u16>,
    pub torque_ticks: Accumulator<u16>,
    /// Zero offset in hertz, from calibration.
    pub offset: u16,
    /// Slope in 1/10 Nm/Hz.
    pub slope: u16,
    /// Revolutions per minute, rounded.
    pub cadence: f64,
    /// Newton meters.
    pub torque: f64,
    /// Watts.
    pub power: f64,
}

impl Default for CrankTorqueFrequency {
    fn default() -> Self {
        Self {
            events: Accumulator::new(),
            timestamp: Accumulator::new(),
            torque_ticks: Accumulator::new(),
            offset: 0,
            slope: 0,
            cadence: f64::NAN,
            torque: f64::NAN,
            power: f64::NAN,
        }
    }
}

impl CrankTorqueFrequency {
    fn apply(&mut self, page: CrankTorqueFrequencyPage) {
        self.slope = page.slope;

        let events = f64::from(self.events.update(page.event_count));
        let elapsed = f64::from(self.timestamp.update(page.timestamp)) * 0.0005;
        let ticks = f64::from(self.torque_ticks.update(page.torque_ticks));

        // The first page only seeds the counters.
        if events == 0.0 || elapsed == 0.0 {
            return;
        }

        let cadence_period = elapsed / events;
        self.cadence = round(60.0 / cadence_period);

        let torque_frequency = ticks / elapsed - f64::from(self.offset);
        self.torque = if self.slope != 0 {
            torque_frequency / (f64::from(self.slope) / 10.0)
        } else {
            f64::NAN
        };
        self.power = self.torque * self.cadence * PI / 30.0;
    }
}

/// Round half away from zero, for non-negative values.
fn round(v: f64) -> f64 {
    (v + 0.5) as u64 as f64
}

/// Outcome of calibration exchanges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationState {
    /// Result of the last manual zero calibration.
    pub last_response: Option<(bool, i16)>,
    pub auto_zero_supported: Option<bool>,
    pub auto_zero_enabled: Option<bool>,
    /// Last flash write acknowledged by a crank torque frequency sensor.
    pub ctf_acknowledged: Option<u8>,
}

/// Fields changed by a bicycle power page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Update {
    Calibration,
    CrankParameters,
    PowerOnly,
    TorqueSensor,
    TorqueEffectiveness,
    CrankTorqueFrequency,
}

/// Telemetry of a bicycle power sensor.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BicyclePower {
    pub power_only: PowerOnly,
    /// Created by the first wheel or crank torque page, whose location it
    /// keeps.
    pub torque_sensor: Option<TorqueSensor>,
    pub torque_effectiveness: TorqueEffectiveness,
    pub crank_parameters: Option<CrankParameters>,
    pub calibration: CalibrationState,
    /// Created by the first crank torque frequency page or zero offset.
    pub crank_torque_frequency: Option<CrankTorqueFrequency>,
}

impl Profile for BicyclePower {
    type Page = BicyclePowerPage;
    type Update = Update;

    fn apply(&mut self, page: BicyclePowerPage, config: &Config) -> Option<Update> {
        let update = match page {
            BicyclePowerPage::Calibration(c) => {
                match c {
                    Calibration::Response {
                        success,
                        auto_zero,
                        data,
                    } => {
                        self.calibration.last_response = Some((success, data));
                        self.calibration.auto_zero_enabled = auto_zero;
                    }
                    Calibration::AutoZeroSupport { supported, enabled } => {
                        self.calibration.auto_zero_supported = Some(supported);
                        self.calibration.auto_zero_enabled = Some(enabled);
                    }
                    Calibration::CtfZeroOffset(offset) => {
                        self.crank_torque_frequency.get_or_insert_default().offset = offset;
                    }
                    Calibration::CtfAcknowledged(id) => {
                        self.calibration.ctf_acknowledged = Some(id);
                    }
                }
                Update::Calibration
            }
            BicyclePowerPage::CrankParameters(p) => {
                self.crank_parameters = Some(p);
                Update::CrankParameters
            }
            BicyclePowerPage::PowerOnly(p) => {
                self.power_only.apply(p);
                Update::PowerOnly
            }
            BicyclePowerPage::WheelTorque(p) => {
                self.torque_sensor
                    .get_or_insert_with(|| TorqueSensor::new(TorqueLocation::Wheel))
                    .apply(p, config.wheel_circumference);
                Update::TorqueSensor
            }
            BicyclePowerPage::CrankTorque(p) => {
                self.torque_sensor
                    .get_or_insert_with(|| TorqueSensor::new(TorqueLocation::Crank))
                    .apply(p, config.wheel_circumference);
                Update::TorqueSensor
            }
            BicyclePowerPage::TorqueEffectiveness(p) => {
                self.torque_effectiveness = p;
                Update::TorqueEffectiveness
            }
            BicyclePowerPage::CrankTorqueFrequency(p) => {
                self.crank_torque_frequency
                    .get_or_insert_default()
                    .apply(p);
                Update::CrankTorqueFrequency
            }
        };

        Some(update)
    }
}

/// Request the crank parameters page.
pub fn request_crank_parameters(timeout: Duration) -> Command {
    let request = RequestDataPage {
        descriptor_1: CrankParameters::SUBPAGE,
        command_type: CommandType::DataPage,
        ..RequestDataPage::new(0x02)
    };

    request.command(timeout)
}
