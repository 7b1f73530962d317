//! Device family telemetry.
//!
//! Each family owns a page table, an enumeration deriving
//! [`FromPage`](macro@crate::sans::FromPage) over the identifiers it claims, and a
//! telemetry record folding decoded pages into running state. Pages a family
//! does not claim are routed to the shared pages by the session.

pub mod background;
pub mod bicycle_power;
pub mod fitness_equipment;
pub mod geocache;
pub mod heart_rate;
pub mod speed_cadence;
pub mod unknown;

use crate::sans::FromPage;

use super::session::Config;

/// A device family's telemetry record.
pub trait Profile {
    /// The pages claimed by the family.
    type Page: FromPage;
    /// A group of fields changed by a page.
    type Update;

    /// Fold a decoded page into the record.
    ///
    /// Returns `None` if the page was accepted but changed nothing worth
    /// reporting.
    fn apply(&mut self, page: Self::Page, config: &Config) -> Option<Self::Update>;
}
