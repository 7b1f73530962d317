//! Stateful device sessions built on the decoders in [`crate::sans`].
//!
//! A [`Session`] follows one device, folding its pages into family telemetry
//! and shared-page state while tracking its connection. The [`Registry`]
//! keeps a session per channel identifier and may be shared between
//! threads.
//!
//! Sessions never read a clock. Every entry point takes the time of the
//! event as a [`Duration`](core::time::Duration) since an epoch of the
//! caller's choosing; the registry uses the time it was created.
//!
//! Changes are reported to an [`Observer`], one [`Notification`] per group of
//! fields changed, and can be read back at any time through
//! [`Session::device`] and [`Session::common`].

pub mod common;
pub mod liveness;
pub mod profiles;
pub mod reassembly;
#[cfg(feature = "std")]
pub mod registry;
pub mod session;

#[cfg(feature = "std")]
pub use registry::Registry;
pub use session::{
    Config, Device, DeviceKind, Error, Event, Notification, Observer, Session, Update,
};
