//! Pure, allocation-free decoding and encoding of data pages.
//!
//! Nothing in this module holds state between pages, except for the
//! [`rollover::Accumulator`] a caller chooses to keep. Stateful device sessions
//! are built on top of these pieces in [`crate::avec`].
//!
//! # Byte order
//!
//! Multi-byte fields are little-endian unless a layout says otherwise. The
//! crank torque frequency page and the trackable identifier codec are
//! big-endian.
//!
//! # Sentinels
//!
//! All-ones values (`0xFF`, `0xFFFF`, `0xFFFF_FFFF`) mean "not available" and
//! decode to `None` or NaN. `0xFE` in the right-hand byte of a paired
//! percentage marks a combined measurement (see [`page::PairedPercent`]).

pub mod channel;
pub mod command;
pub mod common;
pub mod message;
pub mod page;
pub mod rollover;
pub mod trackable;

pub use channel::ChannelId;
pub use page::{FromPage, Page, PageError};
