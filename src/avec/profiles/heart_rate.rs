//! Heart rate monitors (device type 120).

use zerocopy::{FromBytes, byteorder::little_endian::U16};

use crate::{
    avec::session::Config,
    sans::{FromPage, Page, rollover::Accumulator},
};

use super::{
    Profile,
    background::{self, Background, Identification},
};

pub const PREVIOUS_HEART_BEAT: u8 = 0x04;

/// Content of the bytes preceding the measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Detail {
    None,
    Background(Background),
    /// Time of the previous beat in 1/1024 s.
    PreviousHeartBeat(u16),
}

/// A page from a heart rate monitor (identifiers `0x00..=0x04`, with either
/// toggle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRatePage {
    pub toggle: bool,
    pub detail: Detail,
    /// Time of the last beat in 1/1024 s.
    pub beat_time: u16,
    pub beat_count: u8,
    /// Beats per minute, computed by the monitor.
    pub heart_rate: Option<u8>,
}

impl FromPage for HeartRatePage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            id: u8,
            _manufacturer_specific: u8,
            previous_beat_time: U16,
            beat_time: U16,
            beat_count: u8,
            heart_rate: u8,
        }

        let Layout {
            id,
            previous_beat_time,
            beat_time,
            beat_count,
            heart_rate,
            ..
        } = zerocopy::transmute!(page.bytes());

        let detail = match id & background::ID_MASK {
            background::DEFAULT => Detail::None,
            PREVIOUS_HEART_BEAT => Detail::PreviousHeartBeat(previous_beat_time.get()),
            _ => Detail::Background(Background::decode(page)?),
        };

        Some(Self {
            toggle: background::toggle(page),
            detail,
            beat_time: beat_time.get(),
            beat_count,
            heart_rate: match heart_rate {
                0 => None,
                v => Some(v),
            },
        })
    }
}

/// Fields changed by a heart rate page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Update {
    Measurement,
    Identification,
    RrInterval,
}

/// Telemetry of a heart rate monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRate {
    pub identification: Identification,
    pub beats: Accumulator<u8>,
    pub heart_rate: Option<u8>,
    pub beat_time: Option<u16>,
    /// Interval between the last two beats in seconds, or NaN.
    pub rr_interval: f64,
}

impl Default for HeartRate {
    fn default() -> Self {
        Self {
            identification: Identification::default(),
            beats: Accumulator::new(),
            heart_rate: None,
            beat_time: None,
            rr_interval: f64::NAN,
        }
    }
}

impl Profile for HeartRate {
    type Page = HeartRatePage;
    type Update = Update;

    fn apply(&mut self, page: HeartRatePage, _: &Config) -> Option<Update> {
        self.beats.update(page.beat_count);
        self.heart_rate = page.heart_rate;
        self.beat_time = Some(page.beat_time);

        let update = match page.detail {
            Detail::None => Update::Measurement,
            Detail::Background(b) => {
                self.identification.apply(b);
                Update::Identification
            }
            Detail::PreviousHeartBeat(previous) => {
                let interval = page.beat_time.wrapping_sub(previous);
                self.rr_interval = f64::from(interval) / 1024.0;
                Update::RrInterval
            }
        };

        Some(update)
    }
}
