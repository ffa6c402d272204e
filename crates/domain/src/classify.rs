//! Classification of sensor readings into power, energy, or anything else.
//!
//! Classification looks only at the unit of measurement and the optional
//! device class. An absent device class is accepted (many third-party
//! integrations never set one), but an explicit device class other than the
//! matching one disqualifies the entity even if the unit matches.

use serde::{Deserialize, Serialize};

/// Unit spellings treated as instantaneous electrical power.
pub const POWER_UNITS: &[&str] = &["W", "watt", "watts"];

/// Unit spellings treated as accumulated electrical energy.
pub const ENERGY_UNITS: &[&str] = &["Wh", "kWh"];

/// Device class tag of power sensors.
pub const POWER_DEVICE_CLASS: &str = "power";

/// Device class tag of energy sensors.
pub const ENERGY_DEVICE_CLASS: &str = "energy";

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Power,
    Energy,
    Other,
}

/// Classify a reading from its unit and device class.
#[must_use]
pub fn classify(unit: Option<&str>, device_class: Option<&str>) -> Classification {
    let Some(unit) = unit else {
        return Classification::Other;
    };
    if POWER_UNITS.contains(&unit) && accepts(device_class, POWER_DEVICE_CLASS) {
        Classification::Power
    } else if ENERGY_UNITS.contains(&unit) && accepts(device_class, ENERGY_DEVICE_CLASS) {
        Classification::Energy
    } else {
        Classification::Other
    }
}

/// Whether `unit` alone names a power unit, regardless of device class.
#[must_use]
pub fn is_power_unit(unit: Option<&str>) -> bool {
    unit.is_some_and(|unit| POWER_UNITS.contains(&unit))
}

fn accepts(device_class: Option<&str>, expected: &str) -> bool {
    device_class.is_none_or(|class| class == expected)
}
