//! Per-device sessions.
//!
//! A [`Session`] owns everything known about one device: its family
//! telemetry, the shared pages it has sent, and its connection state. Pages
//! are routed first to the device family's page table and then to the shared
//! pages; anything neither claims is ignored.

use alloc::vec::Vec;
use core::time::Duration;
#[cfg(feature = "std")]
extern crate std;

use either::Either::{Left, Right};
use thiserror::Error;

use crate::sans::{
    ChannelId, Page, PageError,
    command::{
        Command, CommandError,
        geocache::{PAGE_COUNT, Program},
    },
    common::route,
    message::{MessageError, Outbound},
};

use super::{
    common::CommonState,
    liveness::{ConnectionState, Liveness, Transition},
    profiles::{
        Profile,
        bicycle_power::{self, BicyclePower},
        fitness_equipment::{self, FitnessEquipment},
        geocache::{self, Geocache},
        heart_rate::{self, HeartRate},
        speed_cadence::{self, BikeCadence, BikeSpeed},
        unknown::Unknown,
    },
};

/// Errors occurring while receiving pages or building commands.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed data page.
    #[error("Malformed data page: {0}")]
    Page(#[from] PageError),
    /// A malformed transport message.
    #[error("Malformed message: {0}")]
    Message(#[from] MessageError),
    /// Invalid command input.
    #[error("Invalid command: {0}")]
    Command(#[from] CommandError),
    /// The command does not apply to this kind of device.
    #[error("Command is not supported by {0:?} devices.")]
    UnsupportedCommand(DeviceKind),
}

/// Device family, from the device type of a channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    BicyclePower,
    FitnessEquipment,
    Geocache,
    HeartRate,
    BikeCadence,
    BikeSpeed,
    Unknown,
}

impl From<u8> for DeviceKind {
    fn from(device_type: u8) -> Self {
        match device_type {
            11 => Self::BicyclePower,
            17 => Self::FitnessEquipment,
            19 => Self::Geocache,
            120 => Self::HeartRate,
            122 => Self::BikeCadence,
            123 => Self::BikeSpeed,
            _ => Self::Unknown,
        }
    }
}

impl DeviceKind {
    /// Silence after which a device of this family is considered offline.
    ///
    /// Geocaches broadcast slowly until a display requests a page.
    pub const fn default_timeout(self) -> Duration {
        match self {
            Self::Geocache => Duration::from_secs(8),
            _ => Duration::from_secs(2),
        }
    }
}

/// Runtime configuration of sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Offline timeout for every device, replacing the family default.
    pub offline_timeout: Option<Duration>,
    /// Wheel circumference in meters, for speed and distance.
    pub wheel_circumference: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            offline_timeout: None,
            wheel_circumference: 2.2,
        }
    }
}

impl Config {
    /// The offline timeout for a device family.
    pub fn timeout(&self, kind: DeviceKind) -> Duration {
        self.offline_timeout.unwrap_or(kind.default_timeout())
    }
}

/// Telemetry of a device, by family.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Device {
    BicyclePower(BicyclePower),
    FitnessEquipment(FitnessEquipment),
    Geocache(Geocache),
    HeartRate(HeartRate),
    BikeCadence(BikeCadence),
    BikeSpeed(BikeSpeed),
    Unknown(Unknown),
}

impl Device {
    /// Empty telemetry for a device family.
    pub fn new(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::BicyclePower => Self::BicyclePower(BicyclePower::default()),
            DeviceKind::FitnessEquipment => Self::FitnessEquipment(FitnessEquipment::default()),
            DeviceKind::Geocache => Self::Geocache(Geocache::default()),
            DeviceKind::HeartRate => Self::HeartRate(HeartRate::default()),
            DeviceKind::BikeCadence => Self::BikeCadence(BikeCadence::default()),
            DeviceKind::BikeSpeed => Self::BikeSpeed(BikeSpeed::default()),
            DeviceKind::Unknown => Self::Unknown(Unknown::default()),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::BicyclePower(_) => DeviceKind::BicyclePower,
            Self::FitnessEquipment(_) => DeviceKind::FitnessEquipment,
            Self::Geocache(_) => DeviceKind::Geocache,
            Self::HeartRate(_) => DeviceKind::HeartRate,
            Self::BikeCadence(_) => DeviceKind::BikeCadence,
            Self::BikeSpeed(_) => DeviceKind::BikeSpeed,
            Self::Unknown(_) => DeviceKind::Unknown,
        }
    }
}

/// A group of fields changed by a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Update {
    /// A shared page, by identifier, was stored in [`Session::common`].
    Common(u8),
    BicyclePower(bicycle_power::Update),
    FitnessEquipment(fitness_equipment::Update),
    Geocache(geocache::Update),
    HeartRate(heart_rate::Update),
    BikeCadence(speed_cadence::Update),
    BikeSpeed(speed_cadence::Update),
    /// A page from an unrecognized device.
    Raw(Page),
}

/// Something that happened to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// The first message, or the first since going offline.
    Online,
    Offline,
    Updated(Update),
}

/// An event, with the device it happened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notification {
    pub channel_id: ChannelId,
    pub event: Event,
}

/// Receive notifications from sessions.
///
/// The default implementation ignores notifications.
pub trait Observer {
    fn notify(&mut self, notification: Notification) {
        let _ = notification;
    }
}

impl Observer for () {}

impl Observer for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

#[cfg(feature = "std")]
impl Observer for std::sync::mpsc::Sender<Notification> {
    fn notify(&mut self, notification: Notification) {
        if self.send(notification).is_err() {
            log::debug!("Dropping notification; receiver is gone.");
        }
    }
}

/// State of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    channel_id: ChannelId,
    config: Config,
    device: Device,
    liveness: Liveness,
    common: CommonState,
    programming: bool,
}

impl Session {
    /// Create a session for a device, choosing its family from the device
    /// type.
    pub fn new(channel_id: ChannelId, config: Config) -> Self {
        let kind = DeviceKind::from(channel_id.device_type());

        Self {
            channel_id,
            config,
            device: Device::new(kind),
            liveness: Liveness::new(config.timeout(kind)),
            common: CommonState::default(),
            programming: false,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn kind(&self) -> DeviceKind {
        self.device.kind()
    }

    /// Snapshot of the family telemetry.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The family telemetry, for commands that record what they request.
    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    /// Snapshot of the shared pages received.
    pub fn common(&self) -> &CommonState {
        &self.common
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration, applying its offline timeout.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.liveness.set_timeout(config.timeout(self.kind()));
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.liveness.state()
    }

    pub fn last_message(&self) -> Option<Duration> {
        self.liveness.last_message()
    }

    /// Message rate in hertz, or NaN before two messages have arrived.
    pub fn message_rate(&self) -> f64 {
        self.liveness.message_rate()
    }

    /// Receive a payload at `now`. Payloads must hold at least a page; bytes
    /// beyond the page are ignored.
    pub fn receive(
        &mut self,
        payload: &[u8],
        now: Duration,
        o: &mut impl Observer,
    ) -> Result<(), Error> {
        let page = Page::try_from(payload)?;
        self.receive_page(&page, now, o);
        Ok(())
    }

    /// Receive a page at `now`.
    pub fn receive_page(&mut self, page: &Page, now: Duration, o: &mut impl Observer) {
        if let Some(Transition::Online) = self.liveness.message(now) {
            log::info!("Device {} is online.", self.channel_id);
            self.notify(o, Event::Online);
        }

        if self.programming {
            log::warn!(
                "Discarding page {:#04X} from {} while programming.",
                page.id(),
                self.channel_id
            );
            return;
        }

        log::trace!("Dispatching page {:#04X} from {}.", page.id(), self.channel_id);

        if let Some(update) = self.dispatch(page) {
            self.notify(o, Event::Updated(update));
        }
    }

    /// Check for a timeout at `now`.
    pub fn poll(&mut self, now: Duration, o: &mut impl Observer) {
        if let Some(Transition::Offline) = self.liveness.poll(now) {
            log::info!("Device {} went offline.", self.channel_id);
            self.notify(o, Event::Offline);
        }
    }

    fn notify(&self, o: &mut impl Observer, event: Event) {
        o.notify(Notification {
            channel_id: self.channel_id,
            event,
        });
    }

    fn dispatch(&mut self, page: &Page) -> Option<Update> {
        let common = &mut self.common;
        let config = &self.config;

        match &mut self.device {
            Device::BicyclePower(d) => dispatch(d, common, page, config, Update::BicyclePower),
            Device::FitnessEquipment(d) => {
                dispatch(d, common, page, config, Update::FitnessEquipment)
            }
            Device::Geocache(d) => dispatch(d, common, page, config, Update::Geocache),
            Device::HeartRate(d) => dispatch(d, common, page, config, Update::HeartRate),
            Device::BikeCadence(d) => dispatch(d, common, page, config, Update::BikeCadence),
            Device::BikeSpeed(d) => dispatch(d, common, page, config, Update::BikeSpeed),
            Device::Unknown(d) => dispatch(d, common, page, config, Update::Raw),
        }
    }

    /// Whether a programming sequence is in progress. Received pages are
    /// discarded while it is.
    pub fn is_programming(&self) -> bool {
        self.programming
    }

    /// Mark a programming sequence as started.
    pub fn begin_programming(&mut self) {
        self.programming = true;
    }

    /// Mark a programming sequence as complete or abandoned.
    pub fn end_programming(&mut self) {
        self.programming = false;
    }

    /// Build the pages programming a geocache, and mark the session as
    /// programming. Call [`Session::end_programming`] once the pages have
    /// been sent.
    pub fn program_geocache(
        &mut self,
        program: &Program,
    ) -> Result<[Page; PAGE_COUNT], Error> {
        let kind = self.kind();
        let Device::Geocache(geocache) = &mut self.device else {
            Err(Error::UnsupportedCommand(kind))?
        };

        let pages = geocache.program(program)?;
        self.programming = true;
        Ok(pages)
    }

    /// Address a command to this device on a channel.
    pub fn outbound(&self, channel_number: u8, command: &Command) -> Outbound {
        Outbound::new(channel_number, self.channel_id, command.page)
    }
}

/// Route a page to a family's telemetry or the shared pages.
fn dispatch<P: Profile>(
    profile: &mut P,
    common: &mut CommonState,
    page: &Page,
    config: &Config,
    wrap: impl FnOnce(P::Update) -> Update,
) -> Option<Update> {
    let Some(routed) = route::<P::Page>(page) else {
        log::debug!("Ignoring unclaimed page {:#04X}.", page.id());
        return None;
    };

    match routed {
        Left(p) => profile.apply(p, config).map(wrap),
        Right(c) => {
            common.apply(&c);
            Some(Update::Common(page.id()))
        }
    }
}
