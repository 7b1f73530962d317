//! Connection state inferred from message arrival times.
//!
//! Timestamps are durations since an arbitrary monotonic epoch chosen by the
//! caller, so the monitor can be driven by any clock.

use core::time::Duration;

/// Connection state of a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// No message has been received yet.
    #[default]
    Searching,
    Connected,
    /// No message has been received within the timeout.
    Offline,
}

/// A change of connection state worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The first message, or the first since going offline.
    Online,
    Offline,
}

/// Tracks the last message time of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Liveness {
    state: ConnectionState,
    last_message: Option<Duration>,
    previous_interval: Option<Duration>,
    timeout: Duration,
}

impl Liveness {
    pub const fn new(timeout: Duration) -> Self {
        Self {
            state: ConnectionState::Searching,
            last_message: None,
            previous_interval: None,
            timeout,
        }
    }

    /// Record a message arriving at `now`.
    pub fn message(&mut self, now: Duration) -> Option<Transition> {
        self.previous_interval = self.last_message.map(|last| now.saturating_sub(last));
        self.last_message = Some(now);

        match self.state {
            ConnectionState::Connected => None,
            ConnectionState::Searching | ConnectionState::Offline => {
                self.state = ConnectionState::Connected;
                Some(Transition::Online)
            }
        }
    }

    /// Check for a timeout at `now`.
    ///
    /// A connected device silent for at least the timeout goes offline. This
    /// is reported once; later checks return `None` until a message arrives.
    pub fn poll(&mut self, now: Duration) -> Option<Transition> {
        let last = self.last_message?;

        if self.state == ConnectionState::Connected && now.saturating_sub(last) >= self.timeout {
            self.state = ConnectionState::Offline;
            Some(Transition::Offline)
        } else {
            None
        }
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub const fn last_message(&self) -> Option<Duration> {
        self.last_message
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Message rate in hertz, from the interval between the last two
    /// messages. NaN until two messages have arrived.
    pub fn message_rate(&self) -> f64 {
        match self.previous_interval {
            Some(interval) if !interval.is_zero() => 1.0 / interval.as_secs_f64(),
            _ => f64::NAN,
        }
    }
}
