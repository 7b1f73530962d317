//! State persisted from the shared data pages.

use alloc::vec::Vec;

use chrono::NaiveDateTime;

use crate::sans::common::{
    AntFsClientBeacon, AntFsCommandResponse, BatteryStatusPage, ChannelState, CommandStatusPage,
    CommonPage, Component, ErrorDescription, ManufacturerInfo, MemoryLevel, NetworkKey,
    PairedDevice, ProductInfo, SubfieldData,
};

/// A peripheral in a device's paired-devices list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peripheral {
    pub index: u8,
    pub peripheral_id: u32,
}

/// Paired-devices list reported by a display or hub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairedDevices {
    pub connected_devices: u8,
    pub is_paired: bool,
    pub channel_state: Option<ChannelState>,
    pub network_key: Option<NetworkKey>,
    /// Peripherals by index, in order of first report. Later reports for an
    /// index already listed do not replace it.
    pub peripherals: Vec<Peripheral>,
}

/// The most recent shared data pages received from a device.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommonState {
    pub manufacturer_info: Option<ManufacturerInfo>,
    pub product_info: Option<ProductInfo>,
    /// The component named by the latest multi-component page. Only a single
    /// component is tracked, regardless of how many the device reports.
    pub component: Option<Component>,
    pub battery_status: Option<BatteryStatusPage>,
    pub time_and_date: Option<NaiveDateTime>,
    pub subfield_data: Option<SubfieldData>,
    pub memory_level: Option<MemoryLevel>,
    pub error_description: Option<ErrorDescription>,
    pub command_status: Option<CommandStatusPage>,
    pub ant_fs_client_beacon: Option<AntFsClientBeacon>,
    pub ant_fs_command_response: Option<AntFsCommandResponse>,
    pub paired_devices: PairedDevices,
}

impl CommonState {
    /// Fold a shared page into the state.
    pub fn apply(&mut self, page: &CommonPage) {
        match *page {
            CommonPage::AntFsClientBeacon(p) => self.ant_fs_client_beacon = Some(p),
            CommonPage::AntFsCommandResponse(p) => self.ant_fs_command_response = Some(p),
            CommonPage::CommandStatus(p) => self.command_status = Some(p),
            CommonPage::MultiComponentManufacturerInfo(p) => {
                self.component = Some(p.component);
                self.manufacturer_info = Some(p.info);
            }
            CommonPage::MultiComponentProductInfo(p) => {
                self.component = Some(p.component);
                self.product_info = Some(p.info);
            }
            CommonPage::ManufacturerInfo(p) => self.manufacturer_info = Some(p),
            CommonPage::ProductInfo(p) => self.product_info = Some(p),
            CommonPage::BatteryStatus(p) => self.battery_status = Some(p),
            CommonPage::TimeAndDate(p) => self.time_and_date = Some(p.0),
            CommonPage::SubfieldData(p) => self.subfield_data = Some(p),
            CommonPage::MemoryLevel(p) => self.memory_level = Some(p),
            CommonPage::PairedDevice(p) => self.apply_paired_device(p),
            CommonPage::ErrorDescription(p) => self.error_description = Some(p),
        }
    }

    fn apply_paired_device(&mut self, p: PairedDevice) {
        let paired = &mut self.paired_devices;
        paired.connected_devices = p.connected_devices;
        paired.is_paired = p.is_paired;
        paired.channel_state = Some(p.channel_state);
        paired.network_key = Some(p.network_key);

        if !paired.peripherals.iter().any(|d| d.index == p.index) {
            paired.peripherals.push(Peripheral {
                index: p.index,
                peripheral_id: p.peripheral_id,
            });
        }
    }
}
