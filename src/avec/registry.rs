//! Concurrent registry of device sessions.
//!
//! _Requires Cargo feature `std`._

use core::time::Duration;
use std::{collections::HashMap, sync::Arc, time::Instant, vec::Vec};

use parking_lot::{Mutex, RwLock};

use crate::sans::{ChannelId, Page, message::Inbound};

use super::session::{Config, Error, Observer, Session};

extern crate std;

/// A shared handle to one device's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Sessions keyed by channel identifier, created on first message.
///
/// Sessions of different devices may be driven from different threads. Each
/// session is locked for the duration of a page, so the liveness poll and
/// the parse path never interleave within one device.
#[derive(Debug)]
pub struct Registry {
    sessions: RwLock<HashMap<ChannelId, SessionHandle>>,
    config: Config,
    epoch: Instant,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            epoch: Instant::now(),
        }
    }

    /// Time since the registry was created, the clock of its sessions.
    pub fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receive a payload from a device now.
    pub fn receive(
        &self,
        channel_id: ChannelId,
        payload: &[u8],
        o: &mut impl Observer,
    ) -> Result<(), Error> {
        self.receive_at(channel_id, payload, self.now(), o)
    }

    /// Receive a payload from a device at `now`.
    ///
    /// Malformed payloads are rejected before a session is created.
    pub fn receive_at(
        &self,
        channel_id: ChannelId,
        payload: &[u8],
        now: Duration,
        o: &mut impl Observer,
    ) -> Result<(), Error> {
        let page = Page::try_from(payload)?;
        self.get_or_insert(channel_id)
            .lock()
            .receive_page(&page, now, o);
        Ok(())
    }

    /// Receive a transport message now, returning its envelope.
    pub fn receive_message(
        &self,
        message: &[u8],
        o: &mut impl Observer,
    ) -> Result<Inbound, Error> {
        let inbound = Inbound::parse(message)?;
        self.get_or_insert(inbound.channel_id)
            .lock()
            .receive_page(&inbound.page, self.now(), o);
        Ok(inbound)
    }

    /// Check every session for a timeout now.
    pub fn poll(&self, o: &mut impl Observer) {
        self.poll_at(self.now(), o);
    }

    /// Check every session for a timeout at `now`.
    pub fn poll_at(&self, now: Duration, o: &mut impl Observer) {
        // Release the registry before locking sessions.
        let sessions: Vec<_> = self.sessions.read().values().cloned().collect();

        for session in sessions {
            session.lock().poll(now, o);
        }
    }

    pub fn session(&self, channel_id: ChannelId) -> Option<SessionHandle> {
        self.sessions.read().get(&channel_id).cloned()
    }

    /// Remove a session. Handles already held remain usable.
    pub fn evict(&self, channel_id: ChannelId) -> Option<SessionHandle> {
        let session = self.sessions.write().remove(&channel_id);
        if session.is_some() {
            log::info!("Evicted session for {channel_id}.");
        }
        session
    }

    pub fn channel_ids(&self) -> Vec<ChannelId> {
        self.sessions.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn get_or_insert(&self, channel_id: ChannelId) -> SessionHandle {
        if let Some(session) = self.session(channel_id) {
            return session;
        }

        self.sessions
            .write()
            .entry(channel_id)
            .or_insert_with(|| {
                let session = Session::new(channel_id, self.config);
                log::info!(
                    "Created {:?} session for {channel_id}.",
                    session.kind()
                );
                Arc::new(Mutex::new(session))
            })
            .clone()
    }
}
