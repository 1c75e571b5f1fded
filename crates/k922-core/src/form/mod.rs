//! A headless model of the panel's input controls.
//!
//! The panel is a form: text inputs and select boxes (one string value each),
//! a single "IMU enabled" checkbox, and three checkbox groups whose items are
//! the members of an enumeration in display order.  [`Form`] keeps exactly
//! that state and nothing else, so the binding layer in [`binding`] can be
//! exercised without any UI toolkit.
//!
//! Controls are addressed by their element ids (`"serialBaud"`,
//! `"rtcmMessages"`, ...) through [`Field::from_id`] and [`Group::from_id`].
//! A field can be missing from a form; [`collect`] treats a missing field the
//! same as an empty one.

pub mod binding;

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::enums::{
    self, SelectOption, COM1_ROLES, CONSTELLATIONS, CORRECTION_FORMATS, CORRECTION_SOURCES,
    INS_PRIORITIES, NMEA_MESSAGES, NMEA_TALKERS, RATES_IMU, RATES_POSITION, RTCM_MESSAGES,
    RTK_MODES, SERIAL_BAUDRATES, TRANSPORT_TYPES,
};

pub use binding::{apply, apply_config, collect};

/// A single-valued control (text input or select box).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    BackendUrl,
    TransportType,
    SerialPort,
    SerialBaud,
    TcpPort,
    Com1Role,
    RtkMode,
    RtkRate,
    RtkBaseline,
    CorrInSource,
    CorrInFormat,
    NmeaTalker,
    NmeaRate,
    ImuRate,
    InsPriority,
    InsMaxGap,
}

impl Field {
    /// Every field, in panel order.
    pub const ALL: [Field; 16] = [
        Field::BackendUrl,
        Field::TransportType,
        Field::SerialPort,
        Field::SerialBaud,
        Field::TcpPort,
        Field::Com1Role,
        Field::RtkMode,
        Field::RtkRate,
        Field::RtkBaseline,
        Field::CorrInSource,
        Field::CorrInFormat,
        Field::NmeaTalker,
        Field::NmeaRate,
        Field::ImuRate,
        Field::InsPriority,
        Field::InsMaxGap,
    ];

    /// The element id of this control.
    pub fn id(self) -> &'static str {
        match self {
            Field::BackendUrl => "backendUrl",
            Field::TransportType => "transportType",
            Field::SerialPort => "serialPort",
            Field::SerialBaud => "serialBaud",
            Field::TcpPort => "tcpPort",
            Field::Com1Role => "com1Role",
            Field::RtkMode => "rtkMode",
            Field::RtkRate => "rtkRate",
            Field::RtkBaseline => "rtkBaseline",
            Field::CorrInSource => "corrInSource",
            Field::CorrInFormat => "corrInFormat",
            Field::NmeaTalker => "nmeaTalker",
            Field::NmeaRate => "nmeaRate",
            Field::ImuRate => "imuRate",
            Field::InsPriority => "insPriority",
            Field::InsMaxGap => "insMaxGap",
        }
    }

    /// Resolves an element id.
    pub fn from_id(id: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.id() == id)
    }

    /// The options of a select box, or an empty list for a free-text input.
    pub fn options(self) -> Vec<SelectOption> {
        match self {
            Field::TransportType => enums::plain_options(TRANSPORT_TYPES),
            Field::SerialBaud => enums::unit_options(SERIAL_BAUDRATES, "bps"),
            Field::Com1Role => enums::plain_options(COM1_ROLES),
            Field::RtkMode => enums::plain_options(RTK_MODES),
            Field::RtkRate | Field::NmeaRate => enums::unit_options(RATES_POSITION, "Hz"),
            Field::CorrInSource => enums::plain_options(CORRECTION_SOURCES),
            Field::CorrInFormat => enums::plain_options(CORRECTION_FORMATS),
            Field::NmeaTalker => enums::plain_options(NMEA_TALKERS),
            Field::ImuRate => enums::unit_options(RATES_IMU, "Hz"),
            Field::InsPriority => enums::plain_options(INS_PRIORITIES),
            Field::BackendUrl
            | Field::SerialPort
            | Field::TcpPort
            | Field::RtkBaseline
            | Field::InsMaxGap => Vec::new(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A multi-select checkbox group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    GnssConstellations,
    RtcmMessages,
    NmeaMessages,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::GnssConstellations, Group::RtcmMessages, Group::NmeaMessages];

    pub fn id(self) -> &'static str {
        match self {
            Group::GnssConstellations => "gnssConstellations",
            Group::RtcmMessages => "rtcmMessages",
            Group::NmeaMessages => "nmeaMessages",
        }
    }

    pub fn from_id(id: &str) -> Option<Group> {
        Group::ALL.into_iter().find(|g| g.id() == id)
    }

    /// The checkbox values of this group, in display order.
    pub fn values(self) -> &'static [&'static str] {
        match self {
            Group::GnssConstellations => CONSTELLATIONS,
            Group::RtcmMessages => RTCM_MESSAGES,
            Group::NmeaMessages => NMEA_MESSAGES,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One checkbox of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem {
    pub value: String,
    pub checked: bool,
}

/// The state of every control on the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    values: BTreeMap<Field, String>,
    groups: BTreeMap<Group, Vec<CheckItem>>,
    imu_enabled: Option<bool>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// A freshly initialised panel: every field present and empty, every
    /// checkbox group populated and unchecked, "IMU enabled" checked.
    pub fn new() -> Self {
        let values = Field::ALL.into_iter().map(|f| (f, String::new())).collect();
        let groups = Group::ALL
            .into_iter()
            .map(|g| {
                let items = g
                    .values()
                    .iter()
                    .map(|v| CheckItem {
                        value: (*v).to_string(),
                        checked: false,
                    })
                    .collect();
                (g, items)
            })
            .collect();
        Self {
            values,
            groups,
            imu_enabled: Some(true),
        }
    }

    /// A form with no controls at all.
    pub fn bare() -> Self {
        Self {
            values: BTreeMap::new(),
            groups: BTreeMap::new(),
            imu_enabled: None,
        }
    }

    /// Current value of a field, or `None` if the field is missing.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Writes a field, adding it if it was missing.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Removes a field from the form.
    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }

    /// State of the "IMU enabled" checkbox, `None` if it is missing.
    pub fn imu_enabled(&self) -> Option<bool> {
        self.imu_enabled
    }

    pub fn set_imu_enabled(&mut self, enabled: bool) {
        self.imu_enabled = Some(enabled);
    }

    /// The checkboxes of a group, or `None` if the group is missing.
    pub fn items(&self, group: Group) -> Option<&[CheckItem]> {
        self.groups.get(&group).map(Vec::as_slice)
    }

    /// Values of the checked boxes of a group, in display order.
    pub fn checked(&self, group: Group) -> Vec<String> {
        self.groups
            .get(&group)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| i.checked)
                    .map(|i| i.value.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks or unchecks the box with `value`.
    ///
    /// Returns `false` if the group has no such box.
    pub fn set_checked(&mut self, group: Group, value: &str, checked: bool) -> bool {
        match self
            .groups
            .get_mut(&group)
            .and_then(|items| items.iter_mut().find(|i| i.value == value))
        {
            Some(item) => {
                item.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Sets every box of a group checked iff its value is in `selected`.
    pub(crate) fn check_exactly(&mut self, group: Group, selected: &[&str]) {
        if let Some(items) = self.groups.get_mut(&group) {
            for item in items.iter_mut() {
                item.checked = selected.contains(&item.value.as_str());
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_has_every_field_empty() {
        let form = Form::new();
        for field in Field::ALL {
            assert_eq!(form.value(field), Some(""), "{field} must start empty");
        }
        assert_eq!(form.imu_enabled(), Some(true));
    }

    #[test]
    fn test_new_form_groups_follow_enumeration_order() {
        let form = Form::new();
        let items = form.items(Group::RtcmMessages).unwrap();
        assert_eq!(items.len(), 11);
        assert_eq!(items[0].value, "1004");
        assert_eq!(items[10].value, "4078");
        assert!(items.iter().all(|i| !i.checked));
    }

    #[test]
    fn test_field_ids_resolve_both_ways() {
        for field in Field::ALL {
            assert_eq!(Field::from_id(field.id()), Some(field));
        }
        assert_eq!(Field::from_id("nope"), None);
    }

    #[test]
    fn test_group_ids_resolve_both_ways() {
        for group in Group::ALL {
            assert_eq!(Group::from_id(group.id()), Some(group));
        }
        assert_eq!(Group::from_id("statusLog"), None);
    }

    #[test]
    fn test_checked_returns_document_order_not_click_order() {
        // Arrange
        let mut form = Form::new();
        assert!(form.set_checked(Group::NmeaMessages, "ZDA", true));
        assert!(form.set_checked(Group::NmeaMessages, "GGA", true));
        assert!(form.set_checked(Group::NmeaMessages, "RMC", true));

        // Act
        let checked = form.checked(Group::NmeaMessages);

        // Assert
        assert_eq!(checked, vec!["GGA", "RMC", "ZDA"]);
    }

    #[test]
    fn test_set_checked_unknown_value_returns_false() {
        let mut form = Form::new();
        assert!(!form.set_checked(Group::GnssConstellations, "NAVIC", true));
        assert!(form.checked(Group::GnssConstellations).is_empty());
    }

    #[test]
    fn test_bare_form_has_no_controls() {
        let form = Form::bare();
        assert_eq!(form.value(Field::SerialBaud), None);
        assert!(form.items(Group::NmeaMessages).is_none());
        assert!(form.checked(Group::NmeaMessages).is_empty());
        assert_eq!(form.imu_enabled(), None);
    }

    #[test]
    fn test_select_fields_expose_labelled_options() {
        let opts = Field::ImuRate.options();
        assert_eq!(opts.last().unwrap().label, "50 Hz");
        assert!(Field::SerialPort.options().is_empty());
    }
}
