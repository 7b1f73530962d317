//! Reassembly of content fragmented over a sequence of pages.
//!
//! Fragments are indexed by their page identifier. A message is taken to begin
//! at the lowest index seen since the last restart and grows as higher indices
//! arrive; a fragment below the first index starts a new message.

use alloc::{borrow::Cow, string::String, vec::Vec};

/// What a fragment did to the reassembled content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The first fragment since the reassembler was created or cleared.
    Started,
    /// A fragment below the first index discarded the previous content.
    Restarted,
    /// A fragment above the last index was appended.
    Appended,
    /// The fragment's index was already consumed; nothing changed.
    Duplicate,
}

impl Outcome {
    /// Whether the content changed.
    pub fn is_change(self) -> bool {
        self != Self::Duplicate
    }
}

/// Reassembly state of one logical multi-page field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reassembler {
    #[default]
    Empty,
    Accumulating {
        first: u8,
        last: u8,
        content: Vec<u8>,
    },
}

impl Reassembler {
    pub const fn new() -> Self {
        Self::Empty
    }

    /// Accept a fragment at an index. Trailing null padding is removed before
    /// the fragment is appended.
    pub fn push(&mut self, index: u8, fragment: &[u8]) -> Outcome {
        let fragment = trim_nulls(fragment);

        match self {
            Self::Empty => {
                self.start(index, fragment);
                Outcome::Started
            }
            Self::Accumulating { first, .. } if index < *first => {
                log::debug!("Restarting reassembly at fragment {index} (was {first}).");
                self.start(index, fragment);
                Outcome::Restarted
            }
            Self::Accumulating { last, content, .. } if index > *last => {
                *last = index;
                content.extend_from_slice(fragment);
                Outcome::Appended
            }
            Self::Accumulating { .. } => Outcome::Duplicate,
        }
    }

    fn start(&mut self, index: u8, fragment: &[u8]) {
        *self = Self::Accumulating {
            first: index,
            last: index,
            content: fragment.to_vec(),
        };
    }

    /// Discard any content.
    pub fn clear(&mut self) {
        *self = Self::Empty;
    }

    /// The first and last fragment indices consumed.
    pub fn range(&self) -> Option<(u8, u8)> {
        match self {
            Self::Empty => None,
            Self::Accumulating { first, last, .. } => Some((*first, *last)),
        }
    }

    /// The reassembled bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Accumulating { content, .. } => content,
        }
    }

    /// The reassembled content as text. Invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.bytes())
    }
}

fn trim_nulls(fragment: &[u8]) -> &[u8] {
    let end = fragment.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &fragment[..end]
}
