//! Construction of outbound command pages.
//!
//! Every function here is pure: it builds a page for the transport to send,
//! and optionally describes the response page to wait for. Waiting, retrying
//! and cancellation belong to the transport.

use core::time::Duration;

use chrono::NaiveDateTime;
use thiserror::Error;

use super::{
    common,
    page::{PAGE_SIZE, Page},
    trackable::TrackableId,
};

/// An error building a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Trackable identifiers hold at most nine characters.
    #[error("Trackable identifier is longer than 9 characters ({0}).")]
    IdentifierTooLong(usize),
    /// Trackable identifiers hold only characters from `' '` to `'_'`.
    #[error("Character {0:?} cannot be encoded in a trackable identifier.")]
    UnencodableCharacter(char),
    /// The hint needs more pages than remain programmable.
    #[error("Hint does not fit in the remaining programmable pages ({0} bytes).")]
    HintTooLong(usize),
    /// Visits can only be logged to a page the geocache has reported.
    #[error("No logged visits page has been received from the geocache.")]
    NoLoggedVisitsPage,
}

/// A command page, with the response expected to acknowledge it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub page: Page,
    pub response: Option<ExpectedResponse>,
}

impl Command {
    /// A command without a correlated response.
    pub const fn new(page: Page) -> Self {
        Self {
            page,
            response: None,
        }
    }

    /// Expect a response page, waiting at most `timeout` for it.
    pub const fn expecting(self, page_id: u8, timeout: Duration) -> Self {
        Self {
            page: self.page,
            response: Some(ExpectedResponse { page_id, timeout }),
        }
    }
}

/// A response page for the transport to correlate with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedResponse {
    pub page_id: u8,
    pub timeout: Duration,
}

/// What a request data page asks the device to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandType {
    DataPage = 1,
    AntFsSession = 2,
    DataPageFromSlave = 3,
    DataPageSet = 4,
}

/// Request data page (`0x46`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDataPage {
    /// The requested page identifier.
    pub page: u8,
    /// Bits 0..7 give the number of times to send the page; bit 7 asks for
    /// acknowledged replies.
    pub transmission_response: u8,
    pub command_type: CommandType,
    pub slave_serial_number: u16,
    pub descriptor_1: u8,
    pub descriptor_2: u8,
}

impl RequestDataPage {
    /// Request a page four times, with no slave serial number or descriptors.
    pub const fn new(page: u8) -> Self {
        Self {
            page,
            transmission_response: 0x04,
            command_type: CommandType::DataPage,
            slave_serial_number: 0xFFFF,
            descriptor_1: 0xFF,
            descriptor_2: 0xFF,
        }
    }

    pub fn encode(&self) -> Page {
        let [serial_lo, serial_hi] = self.slave_serial_number.to_le_bytes();

        Page::new([
            common::id::REQUEST_DATA_PAGE,
            serial_lo,
            serial_hi,
            self.descriptor_1,
            self.descriptor_2,
            self.transmission_response,
            self.page,
            self.command_type as u8,
        ])
    }

    /// Build the command, expecting the requested page in response.
    pub fn command(&self, timeout: Duration) -> Command {
        Command::new(self.encode()).expecting(self.page, timeout)
    }
}

/// Bicycle power calibration commands.
pub mod calibration {
    use super::*;

    pub const PAGE: u8 = 0x01;
    pub const CTF_DEFINED: u8 = 0x10;
    pub const AUTO_ZERO_SUPPORT: u8 = 0x12;
    pub const MANUAL_ZERO_REQUEST: u8 = 0xAA;
    pub const AUTO_ZERO_CONFIGURATION: u8 = 0xAB;
    pub const RESPONSE_SUCCESS: u8 = 0xAC;
    pub const RESPONSE_FAILURE: u8 = 0xAF;

    /// Crank torque frequency defined message identifiers.
    pub const CTF_ZERO_OFFSET: u8 = 0x01;
    pub const CTF_SLOPE: u8 = 0x02;
    pub const CTF_SERIAL_NUMBER: u8 = 0x03;
    pub const CTF_ACKNOWLEDGE: u8 = 0xAC;

    /// Request a manual zero calibration. The sensor answers with a
    /// calibration response page.
    pub fn manual_zero(timeout: Duration) -> Command {
        let mut r = [0xFF; PAGE_SIZE];
        r[0] = PAGE;
        r[1] = MANUAL_ZERO_REQUEST;
        Command::new(Page::new(r)).expecting(PAGE, timeout)
    }

    /// Enable or disable automatic zeroing.
    pub fn auto_zero(enabled: bool) -> Command {
        let mut r = [0xFF; PAGE_SIZE];
        r[0] = PAGE;
        r[1] = AUTO_ZERO_CONFIGURATION;
        r[2] = enabled as u8;
        Command::new(Page::new(r))
    }

    fn ctf_write(id: u8, value: u16) -> Command {
        let [hi, lo] = value.to_be_bytes();
        let page = Page::new([PAGE, CTF_DEFINED, id, 0xFF, 0xFF, 0xFF, hi, lo]);
        Command::new(page)
    }

    /// Save a crank torque frequency slope, in 1/10 Nm/Hz, to the sensor's
    /// flash.
    pub fn ctf_save_slope(slope: u16) -> Command {
        ctf_write(CTF_SLOPE, slope)
    }

    /// Save a crank torque frequency serial number to the sensor's flash.
    pub fn ctf_save_serial_number(serial_number: u16) -> Command {
        ctf_write(CTF_SERIAL_NUMBER, serial_number)
    }
}

/// Geocache commands.
pub mod geocache {
    use chrono::NaiveDate;

    use super::*;

    pub const TRACKABLE_ID: u8 = 0x00;
    pub const PIN: u8 = 0x01;
    pub const AUTHENTICATION: u8 = 0x20;
    /// Programmable pages run from here to [`LAST_PAGE`].
    pub const FIRST_DATA_PAGE: u8 = 0x02;
    pub const LAST_PAGE: u8 = 0x1F;
    /// Number of pages written by [`program`].
    pub const PAGE_COUNT: usize = LAST_PAGE as usize + 1;

    pub const LATITUDE: u8 = 0;
    pub const LONGITUDE: u8 = 1;
    pub const HINT: u8 = 2;
    pub const LOGGED_VISITS: u8 = 4;

    /// Bytes of hint text carried per page.
    pub const HINT_FRAGMENT: usize = 6;

    /// Epoch of visit timestamps.
    pub fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1989, 12, 31)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    /// Request the PIN page. Geocaches switch to a faster message rate on
    /// receiving a request.
    pub fn request_pin() -> Command {
        RequestDataPage::new(PIN).command(Duration::from_secs(4))
    }

    /// Request an authentication token for a GPS serial number.
    pub fn request_authentication(nonce: [u8; 2], serial_number: u32) -> Command {
        let [a, b] = nonce;
        let [s0, s1, s2, s3] = serial_number.to_le_bytes();
        let page = Page::new([AUTHENTICATION, 0xFF, a, b, s0, s1, s2, s3]);
        Command::new(page)
    }

    /// Write a logged visits page.
    pub fn log_visits(page: u8, timestamp: NaiveDateTime, visits: u16) -> Command {
        let seconds = (timestamp - epoch()).num_seconds().max(0);
        let seconds = u32::try_from(seconds).unwrap_or(u32::MAX);

        let [t0, t1, t2, t3] = seconds.to_le_bytes();
        let [v0, v1] = visits.to_le_bytes();
        Command::new(Page::new([page, LOGGED_VISITS, t0, t1, t2, t3, v0, v1]))
    }

    /// Contents to program into a geocache.
    #[derive(Debug, Clone, Copy)]
    pub struct Program<'a> {
        pub id: TrackableId,
        pub pin: u32,
        /// Latitude in semicircles.
        pub latitude: Option<i32>,
        /// Longitude in semicircles.
        pub longitude: Option<i32>,
        pub hint: &'a str,
    }

    /// Build the full sequence of pages programming a geocache, in the order
    /// they must be sent.
    ///
    /// Every page from `0x00` to `0x1F` is written exactly once: the
    /// identifier, a cleared logged visits page, the coordinates and hint
    /// from page 3 onward, the PIN page recording the number of pages used,
    /// and blank pages for the remainder.
    pub fn program(program: &Program) -> Result<[Page; PAGE_COUNT], CommandError> {
        let mut pages = [Page::new([0xFF; PAGE_SIZE]); PAGE_COUNT];
        let mut sent = 0;
        let mut send = |page: Page| {
            pages[sent] = page;
            sent += 1;
        };

        let coordinates = program.latitude.is_some() as usize + program.longitude.is_some() as usize;
        let hint = program.hint.as_bytes();
        // Hints are always terminated by at least one null byte.
        let hint_pages = if hint.is_empty() {
            0
        } else {
            hint.len() / HINT_FRAGMENT + 1
        };
        if hint_pages > PAGE_COUNT - 3 - coordinates {
            Err(CommandError::HintTooLong(hint.len()))?;
        }

        let mut id = [0; PAGE_SIZE];
        id[0] = TRACKABLE_ID;
        id[1..].copy_from_slice(&program.id.encode());
        send(Page::new(id));

        send(Page::new([
            FIRST_DATA_PAGE,
            LOGGED_VISITS,
            0xFF,
            0xFF,
            0xFF,
            0xFF,
            0x00,
            0x00,
        ]));

        let mut next = FIRST_DATA_PAGE + 1;

        for (data_id, value) in [(LATITUDE, program.latitude), (LONGITUDE, program.longitude)] {
            if let Some(value) = value {
                let [c0, c1, c2, c3] = value.to_le_bytes();
                send(Page::new([next, data_id, c0, c1, c2, c3, 0xFF, 0xFF]));
                next += 1;
            }
        }

        for i in 0..hint_pages {
            let mut r = [0; PAGE_SIZE];
            r[0] = next;
            r[1] = HINT;
            let start = i * HINT_FRAGMENT;
            let end = hint.len().min(start + HINT_FRAGMENT);
            r[2..2 + end - start].copy_from_slice(&hint[start..end]);
            send(Page::new(r));
            next += 1;
        }

        let [p0, p1, p2, p3] = program.pin.to_le_bytes();
        send(Page::new([PIN, 0xFF, p0, p1, p2, p3, next, 0xFF]));

        for page in next..=LAST_PAGE {
            let mut r = [0xFF; PAGE_SIZE];
            r[0] = page;
            send(Page::new(r));
        }

        Ok(pages)
    }
}
