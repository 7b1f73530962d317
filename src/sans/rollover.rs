//! Recovery of monotone totals from wrapping wire counters.

/// A fixed-width unsigned counter which wraps silently on the wire.
pub trait Counter: Copy + PartialEq {
    /// Number of distinct values before the counter wraps.
    const MODULUS: u32;

    /// Distance travelled from `last` to `self`, assuming at most one wrap.
    fn wrapping_delta(self, last: Self) -> u32;
}

impl Counter for u8 {
    const MODULUS: u32 = 0x100;

    fn wrapping_delta(self, last: Self) -> u32 {
        u32::from(self.wrapping_sub(last))
    }
}

impl Counter for u16 {
    const MODULUS: u32 = 0x1_0000;

    fn wrapping_delta(self, last: Self) -> u32 {
        u32::from(self.wrapping_sub(last))
    }
}

/// Compute the delta between a new raw sample and the last-seen sample.
///
/// Returns the delta, always in `0..C::MODULUS`, and the sample to store as the
/// new last-seen value. Without a previous sample, no delta is inferable and
/// the delta is zero.
pub fn delta<C: Counter>(last: Option<C>, raw: C) -> (u32, C) {
    match last {
        Some(last) => (raw.wrapping_delta(last), raw),
        None => (0, raw),
    }
}

/// Running total fed from a wrapping counter.
///
/// Every sample of the counter must be passed to [`Accumulator::update`],
/// including those which appear unchanged, so that the last-seen value stays
/// current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Accumulator<C> {
    last: Option<C>,
    total: u64,
}

impl<C: Counter> Accumulator<C> {
    pub const fn new() -> Self {
        Self {
            last: None,
            total: 0,
        }
    }

    /// Record a raw sample, returning its delta from the previous sample.
    pub fn update(&mut self, raw: C) -> u32 {
        let (delta, last) = delta(self.last, raw);
        self.last = Some(last);
        self.total += u64::from(delta);
        delta
    }

    /// The accumulated total. Never decreases.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The last raw sample, if any has been seen.
    pub const fn last(&self) -> Option<C> {
        self.last
    }

    /// Whether a first sample has been seen.
    pub const fn is_seeded(&self) -> bool {
        self.last.is_some()
    }
}
