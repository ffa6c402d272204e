//! Provisioned records: what exists once a plan (or a manual request) has
//! been accepted.
//!
//! A record stands in for the host's configuration entry: it holds the
//! dedup key that keeps discovery idempotent, plus everything the host needs
//! to create one accumulating energy sensor per power entity.

use serde::{Deserialize, Serialize};

use crate::discovery::{DedupKey, Plan, name_from_entity_id, record_title};
use crate::error::{PowerScoutError, ValidationError};
use crate::id::{AreaId, DeviceId, EntityId, RecordId};
use crate::snapshot::SENSOR_DOMAIN;
use crate::time::{Timestamp, now};

/// Riemann-sum variant used by the host's integration sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationMethod {
    #[default]
    Trapezoidal,
    Left,
    Right,
}

impl IntegrationMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trapezoidal => "trapezoidal",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::str::FromStr for IntegrationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trapezoidal" => Ok(Self::Trapezoidal),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown integration method {other:?}")),
        }
    }
}

/// Parameters handed to the host when it creates the energy sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergySensorSettings {
    pub integration_method: IntegrationMethod,
    pub round_digits: u8,
    /// SI prefix of the output unit: `"k"` for kWh, `""` for Wh.
    pub unit_prefix: String,
    pub max_sub_interval_minutes: u32,
}

impl EnergySensorSettings {
    /// Settings used for records created from discovery.
    #[must_use]
    pub fn discovered() -> Self {
        Self {
            integration_method: IntegrationMethod::Trapezoidal,
            round_digits: 3,
            unit_prefix: "k".to_string(),
            max_sub_interval_minutes: 1,
        }
    }

    /// Defaults for a manual creation request.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            integration_method: IntegrationMethod::Trapezoidal,
            round_digits: 2,
            unit_prefix: "k".to_string(),
            max_sub_interval_minutes: 5,
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when round digits exceed 10, the
    /// sub-interval is outside 1–60 minutes, or the prefix is neither `""`
    /// nor `"k"`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.round_digits > 10 {
            return Err(ValidationError::RoundDigitsOutOfRange(u32::from(
                self.round_digits,
            )));
        }
        if !(1..=60).contains(&self.max_sub_interval_minutes) {
            return Err(ValidationError::MaxSubIntervalOutOfRange(
                self.max_sub_interval_minutes,
            ));
        }
        if !matches!(self.unit_prefix.as_str(), "" | "k") {
            return Err(ValidationError::UnsupportedUnitPrefix(
                self.unit_prefix.clone(),
            ));
        }
        Ok(())
    }

    /// Unit of the accumulated value.
    #[must_use]
    pub fn energy_unit(&self) -> String {
        format!("{}Wh", self.unit_prefix)
    }
}

impl Default for EnergySensorSettings {
    fn default() -> Self {
        Self::discovered()
    }
}

/// How a record came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrigin {
    Discovery,
    Manual,
}

impl RecordOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Manual => "manual",
        }
    }
}

impl std::str::FromStr for RecordOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(Self::Discovery),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown record origin {other:?}")),
        }
    }
}

/// An accepted provisioning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedRecord {
    pub id: RecordId,
    pub dedup_key: DedupKey,
    pub title: String,
    pub display_name: String,
    pub power_entity_ids: Vec<EntityId>,
    pub device_id: Option<DeviceId>,
    pub area_id: Option<AreaId>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub origin: RecordOrigin,
    pub settings: EnergySensorSettings,
    pub created_at: Timestamp,
}

/// One energy sensor the host should create for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergySensorSpec {
    pub source_entity_id: EntityId,
    pub unique_id: String,
    pub name: String,
    pub unit: String,
}

impl ProvisionedRecord {
    /// Accept a discovery plan.
    #[must_use]
    pub fn from_plan(plan: Plan) -> Self {
        Self {
            id: RecordId::new(),
            title: plan.title(),
            dedup_key: plan.dedup_key,
            display_name: plan.display_name,
            power_entity_ids: plan.power_entity_ids,
            device_id: plan.target_device_id,
            area_id: plan.area_id,
            manufacturer: plan.manufacturer,
            model: plan.model,
            origin: RecordOrigin::Discovery,
            settings: EnergySensorSettings::discovered(),
            created_at: now(),
        }
    }

    /// Build a record for an explicitly requested power entity.
    ///
    /// # Errors
    ///
    /// Returns [`PowerScoutError::Validation`] when the settings are out of
    /// range.
    pub fn manual(
        power_entity_id: EntityId,
        device_id: Option<DeviceId>,
        area_id: Option<AreaId>,
        settings: EnergySensorSettings,
    ) -> Result<Self, PowerScoutError> {
        settings.validate()?;
        let display_name = manual_sensor_name(&power_entity_id);
        Ok(Self {
            id: RecordId::new(),
            dedup_key: DedupKey::for_manual(&power_entity_id),
            title: record_title(&display_name, 1),
            display_name,
            power_entity_ids: vec![power_entity_id],
            device_id,
            area_id,
            manufacturer: None,
            model: None,
            origin: RecordOrigin::Manual,
            settings,
            created_at: now(),
        })
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PowerScoutError::Validation`] when the name is empty, there
    /// are no power entities, or the settings are out of range.
    pub fn validate(&self) -> Result<(), PowerScoutError> {
        if self.display_name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.power_entity_ids.is_empty() {
            return Err(ValidationError::NoPowerEntities.into());
        }
        self.settings.validate()?;
        Ok(())
    }

    /// The energy sensors the host should create, one per power entity.
    #[must_use]
    pub fn energy_sensors(&self) -> Vec<EnergySensorSpec> {
        self.power_entity_ids
            .iter()
            .enumerate()
            .map(|(index, source)| EnergySensorSpec {
                source_entity_id: source.clone(),
                unique_id: format!("{}_energy_{index}", self.id),
                name: energy_sensor_name(source),
                unit: self.settings.energy_unit(),
            })
            .collect()
    }
}

/// `sensor.desk_plug_power` → `Desk Plug Energy`.
#[must_use]
pub fn energy_sensor_name(power_entity_id: &EntityId) -> String {
    let base = name_from_entity_id(power_entity_id);
    let base = base.strip_suffix(" Power").unwrap_or(&base);
    format!("{base} Energy")
}

/// Companion entity id a manual request reserves: `sensor.<object_id>_total_energy`.
#[must_use]
pub fn manual_companion_id(power_entity_id: &EntityId) -> Option<EntityId> {
    EntityId::from_parts(
        SENSOR_DOMAIN,
        &format!("{}_total_energy", power_entity_id.object_id()),
    )
    .ok()
}

/// `sensor.desk_plug_power` → `desk_plug Total Energy`.
#[must_use]
pub fn manual_sensor_name(power_entity_id: &EntityId) -> String {
    let stripped = power_entity_id
        .object_id()
        .replace("_power", "")
        .replace("power", "");
    format!("{} Total Energy", stripped.trim_matches('_'))
}
