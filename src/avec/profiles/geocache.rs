//! Geocaches (device type 19).
//!
//! A geocache broadcasts its trackable identifier and PIN page, followed by
//! programmable pages `0x02..=0x1F`, each tagged with a data identifier:
//! coordinates of the next stage, a hint split over several pages, and a log
//! of visits.

use alloc::borrow::Cow;

use chrono::{NaiveDateTime, TimeDelta};
use zerocopy::{
    FromBytes,
    byteorder::little_endian::{I32, U16, U32},
};

use crate::{
    avec::{reassembly::Reassembler, session::Config},
    sans::{
        FromPage, Page,
        command::{
            Command, CommandError,
            geocache::{self, Program},
        },
        page::Available,
        trackable::TrackableId,
    },
};

use super::Profile;

/// Pages claimed by geocaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPage)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeocachePage {
    #[page(0x00)]
    TrackableId(TrackableId),
    #[page(0x01)]
    Pin(PinPage),
    #[page(0x02..=0x1F)]
    Data(DataPage),
    #[page(0x20)]
    Authentication(AuthenticationPage),
}

impl FromPage for TrackableId {
    fn from_page(page: &Page) -> Option<Self> {
        let [_, r @ ..] = page.bytes();
        Some(Self::decode(r))
    }
}

/// PIN page (`0x01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinPage {
    pub pin: Option<u32>,
    /// Number of pages written when the geocache was programmed.
    pub total_pages_programmed: Option<u8>,
}

impl FromPage for PinPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            _page: u8,
            _reserved: u8,
            pin: U32,
            total_pages_programmed: u8,
            _reserved_2: u8,
        }

        let Layout {
            pin,
            total_pages_programmed,
            ..
        } = zerocopy::transmute!(page.bytes());

        Some(Self {
            pin: pin.get().available(),
            total_pages_programmed: total_pages_programmed.available(),
        })
    }
}

/// Content of a programmable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Data {
    /// Semicircles.
    Latitude(i32),
    /// Semicircles.
    Longitude(i32),
    /// Fragment of the hint, padded with nulls.
    Hint([u8; geocache::HINT_FRAGMENT]),
    LoggedVisits {
        /// Time of the last visit, if any visit has been logged.
        last_visit: Option<NaiveDateTime>,
        count: u16,
    },
}

/// A programmable page (`0x02..=0x1F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPage {
    pub index: u8,
    pub data: Data,
}

impl FromPage for DataPage {
    fn from_page(page: &Page) -> Option<Self> {
        #[repr(C)]
        #[derive(FromBytes)]
        struct Layout {
            index: u8,
            data_id: u8,
            payload: [u8; 6],
        }

        #[repr(C)]
        #[derive(FromBytes)]
        struct Coordinate {
            value: I32,
            _reserved: [u8; 2],
        }

        #[repr(C)]
        #[derive(FromBytes)]
        struct Visits {
            timestamp: U32,
            count: U16,
        }

        let Layout {
            index,
            data_id,
            payload,
        } = zerocopy::transmute!(page.bytes());

        let data = match data_id {
            geocache::LATITUDE => {
                let Coordinate { value, .. } = zerocopy::transmute!(payload);
                Data::Latitude(value.get())
            }
            geocache::LONGITUDE => {
                let Coordinate { value, .. } = zerocopy::transmute!(payload);
                Data::Longitude(value.get())
            }
            geocache::HINT => Data::Hint(payload),
            geocache::LOGGED_VISITS => {
                let Visits { timestamp, count } = zerocopy::transmute!(payload);
                let count = count.get();
                let last_visit = if count > 0 {
                    geocache::epoch()
                        .checked_add_signed(TimeDelta::seconds(i64::from(timestamp.get())))
                } else {
                    None
                };
                Data::LoggedVisits { last_visit, count }
            }
            _ => return None,
        };

        Some(Self { index, data })
    }
}

/// Authentication page (`0x20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthenticationPage {
    pub token: [u8; 7],
}

impl FromPage for AuthenticationPage {
    fn from_page(page: &Page) -> Option<Self> {
        let [_, token @ ..] = page.bytes();
        Some(Self { token })
    }
}

/// Fields changed by a geocache page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Update {
    TrackableId,
    Pin,
    Latitude,
    Longitude,
    Hint,
    LoggedVisits,
    AuthenticationToken,
}

/// Telemetry of a geocache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geocache {
    pub trackable_id: Option<TrackableId>,
    pub pin: Option<u32>,
    pub total_pages_programmed: Option<u8>,
    /// Latitude of the next stage in semicircles.
    pub latitude: Option<i32>,
    /// Longitude of the next stage in semicircles.
    pub longitude: Option<i32>,
    hint: Reassembler,
    pub visits: Option<u16>,
    pub last_visit: Option<NaiveDateTime>,
    /// Page holding the logged visits, needed to log another.
    logged_visits_page: Option<u8>,
    authentication_requested: bool,
    pub authentication_token: Option<[u8; 7]>,
}

impl Geocache {
    /// The reassembled hint.
    pub fn hint(&self) -> Cow<'_, str> {
        self.hint.text()
    }

    /// Latitude of the next stage in degrees.
    pub fn latitude_degrees(&self) -> Option<f64> {
        self.latitude.map(semicircles_to_degrees)
    }

    /// Longitude of the next stage in degrees.
    pub fn longitude_degrees(&self) -> Option<f64> {
        self.longitude.map(semicircles_to_degrees)
    }

    pub fn logged_visits_page(&self) -> Option<u8> {
        self.logged_visits_page
    }

    /// Request the PIN page, discarding the hint so it is received afresh.
    pub fn request_pin(&mut self) -> Command {
        self.hint.clear();
        geocache::request_pin()
    }

    /// Request an authentication token. The next authentication page is
    /// accepted as the response; unsolicited pages are ignored.
    pub fn request_authentication(&mut self, nonce: [u8; 2], serial_number: u32) -> Command {
        self.authentication_requested = true;
        geocache::request_authentication(nonce, serial_number)
    }

    /// Log a visit at `timestamp`, incrementing the visit count.
    pub fn log_visit(&self, timestamp: NaiveDateTime) -> Result<Command, CommandError> {
        let page = self
            .logged_visits_page
            .ok_or(CommandError::NoLoggedVisitsPage)?;
        let visits = self.visits.unwrap_or(0).saturating_add(1);

        Ok(geocache::log_visits(page, timestamp, visits))
    }

    /// Build the pages programming the geocache, discarding the hint.
    ///
    /// The owning session should be marked as programming while the pages
    /// are sent.
    pub fn program(
        &mut self,
        program: &Program,
    ) -> Result<[Page; geocache::PAGE_COUNT], CommandError> {
        let pages = geocache::program(program)?;
        self.hint.clear();
        Ok(pages)
    }
}

fn semicircles_to_degrees(v: i32) -> f64 {
    f64::from(v) * (180.0 / 2_147_483_648.0)
}

impl Profile for Geocache {
    type Page = GeocachePage;
    type Update = Update;

    fn apply(&mut self, page: GeocachePage, _: &Config) -> Option<Update> {
        match page {
            GeocachePage::TrackableId(id) => {
                self.trackable_id = Some(id);
                Some(Update::TrackableId)
            }
            GeocachePage::Pin(p) => {
                if let Some(pin) = p.pin {
                    self.pin = Some(pin);
                }
                if let Some(total) = p.total_pages_programmed {
                    self.total_pages_programmed = Some(total);
                }
                Some(Update::Pin)
            }
            GeocachePage::Data(DataPage { index, data }) => match data {
                Data::Latitude(v) => {
                    self.latitude = Some(v);
                    Some(Update::Latitude)
                }
                Data::Longitude(v) => {
                    self.longitude = Some(v);
                    Some(Update::Longitude)
                }
                Data::Hint(fragment) => self
                    .hint
                    .push(index, &fragment)
                    .is_change()
                    .then_some(Update::Hint),
                Data::LoggedVisits { last_visit, count } => {
                    self.logged_visits_page = Some(index);
                    self.visits = Some(count);
                    self.last_visit = last_visit;
                    Some(Update::LoggedVisits)
                }
            },
            GeocachePage::Authentication(p) => {
                if !self.authentication_requested {
                    log::debug!("Ignoring unsolicited authentication page.");
                    return None;
                }
                self.authentication_requested = false;
                self.authentication_token = Some(p.token);
                Some(Update::AuthenticationToken)
            }
        }
    }
}
