//! Municipality record
//!
//! Field names are matched case-insensitively when decoding, so both the
//! upstream payload (`"nome"`) and hand-written bodies (`"Name"`, `"ID"`) are
//! accepted. Anything else in the object is ignored.

use crate::StorageError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Accepted spellings for the name field, in order of preference
const NAME_FIELDS: &[&str] = &["nome", "name"];

/// A municipality as mirrored from the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Municipality {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Mutable part of a municipality, as carried by an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalityFields {
    pub name: String,
}

impl Municipality {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Decode a municipality from a JSON object
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, StorageError> {
        let id = lookup(object, &["id"])
            .ok_or_else(|| StorageError::InvalidRecord("missing field `id`".to_string()))?;
        let id = integer_id(id)?;

        let MunicipalityFields { name } = MunicipalityFields::from_json_object(object)?;
        Ok(Self { id, name })
    }

    /// Overwrite every mutable field, keeping the identifier
    pub fn apply(&mut self, fields: MunicipalityFields) {
        self.name = fields.name;
    }
}

impl MunicipalityFields {
    /// Decode the mutable fields from a JSON object.
    ///
    /// The `id` is optional here and its value is not used, but when present
    /// it must still be an integer.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, StorageError> {
        if let Some(id) = lookup(object, &["id"]) {
            integer_id(id)?;
        }

        let name = lookup(object, NAME_FIELDS)
            .ok_or_else(|| StorageError::InvalidRecord("missing field `nome`".to_string()))?;
        let name = name.as_str().ok_or_else(|| {
            StorageError::InvalidRecord(format!("field `nome` must be a string, got {}", name))
        })?;

        Ok(Self {
            name: name.to_string(),
        })
    }
}

impl From<Municipality> for MunicipalityFields {
    fn from(record: Municipality) -> Self {
        Self { name: record.name }
    }
}

impl<'de> Deserialize<'de> for Municipality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_json_object(&object).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for MunicipalityFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_json_object(&object).map_err(serde::de::Error::custom)
    }
}

fn integer_id(value: &Value) -> Result<i64, StorageError> {
    value.as_i64().ok_or_else(|| {
        StorageError::InvalidRecord(format!("field `id` must be an integer, got {}", value))
    })
}

/// Find the first key matching one of `names`, ignoring ASCII case
fn lookup<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}
