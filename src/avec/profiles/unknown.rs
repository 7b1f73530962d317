//! Devices of an unrecognized type.

use crate::{
    avec::session::Config,
    sans::{FromPage, Page, common::CommonPage},
};

use super::Profile;

/// Any page not claimed by the shared pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPage(pub Page);

impl FromPage for RawPage {
    fn from_page(page: &Page) -> Option<Self> {
        match CommonPage::from_page(page) {
            Some(_) => None,
            None => Some(Self(*page)),
        }
    }
}

/// The last page received from an unrecognized device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unknown {
    pub last_page: Option<Page>,
}

impl Profile for Unknown {
    type Page = RawPage;
    type Update = Page;

    fn apply(&mut self, RawPage(page): RawPage, _: &Config) -> Option<Page> {
        self.last_page = Some(page);
        Some(page)
    }
}
