//! File-backed [`RegistrySource`].

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use powerscout_app::ports::{RegistryDump, RegistrySource};
use powerscout_domain::error::{MalformedInputError, PowerScoutError};

use crate::dto::{DeviceRow, EntityRow, StateRow};
use crate::error::RegistryFileError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDump {
    entities: Value,
    states: Value,
    devices: Value,
}

/// Parse a registry export, skipping elements that do not fit.
///
/// # Errors
///
/// Returns [`RegistryFileError::Json`] when the document itself is not a JSON
/// object.
pub fn parse_dump(content: &str) -> Result<RegistryDump, RegistryFileError> {
    let raw: RawDump = serde_json::from_str(content)?;
    let mut skipped = 0;
    let entities = convert::<EntityRow, _>("entity", raw.entities, &mut skipped);
    let states = convert::<StateRow, _>("state", raw.states, &mut skipped);
    let devices = convert::<DeviceRow, _>("device", raw.devices, &mut skipped);
    Ok(RegistryDump {
        entities,
        states,
        devices,
        skipped,
    })
}

/// Elements of one section. A missing or `null` section is empty; any other
/// non-array value is skipped as a whole.
fn section(kind: &'static str, value: Value, skipped: &mut usize) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        other => {
            tracing::warn!(kind, found = %other, "skipping registry section that is not a list");
            *skipped += 1;
            Vec::new()
        }
    }
}

fn convert<Row, T>(kind: &'static str, section_value: Value, skipped: &mut usize) -> Vec<T>
where
    Row: DeserializeOwned,
    T: TryFrom<Row, Error = MalformedInputError>,
{
    section(kind, section_value, skipped)
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let converted = serde_json::from_value::<Row>(value)
                .map_err(|err| err.to_string())
                .and_then(|row| T::try_from(row).map_err(|err| err.to_string()));
            match converted {
                Ok(item) => Some(item),
                Err(error) => {
                    tracing::warn!(kind, index, %error, "skipping malformed registry element");
                    *skipped += 1;
                    None
                }
            }
        })
        .collect()
}

/// Reads the registry export from disk on every load, so edits to the file
/// are picked up by the next pass.
pub struct JsonRegistrySource {
    path: PathBuf,
}

impl JsonRegistrySource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistrySource for JsonRegistrySource {
    fn load(&self) -> impl Future<Output = Result<RegistryDump, PowerScoutError>> + Send {
        let path = self.path.clone();
        async move {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| RegistryFileError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            let dump = parse_dump(&content)?;
            tracing::debug!(
                path = %path.display(),
                entities = dump.entities.len(),
                states = dump.states.len(),
                devices = dump.devices.len(),
                skipped = dump.skipped,
                "registry loaded"
            );
            Ok(dump)
        }
    }
}
