//! # Configuration Codec
//!
//! Translates between typed connector configuration and the opaque JSON
//! bytes Dex stores for each connector.
//!
//! The JSON document is handled as an ordered [`ConfigMap`]. Decoding
//! *takes* known keys out of the map; whatever is left over is the
//! extension bucket and is handed back to the typed view unchanged.
//! Encoding writes known keys first and then merges the extension bucket
//! without overwriting them.

pub mod oidc;
pub mod templates;

pub use oidc::{ClaimMapping, OidcConfig};

use crate::secret::SecretString;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Ordered JSON object, the in-memory form of a connector config
pub type ConfigMap = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("config is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("config must be a JSON object")]
    NotAnObject,

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Parse connector config bytes into a map. Empty input is an empty map.
///
/// # Errors
/// Returns an error if the bytes are not a JSON object
pub fn parse_object(bytes: &[u8]) -> Result<ConfigMap, CodecError> {
    if bytes.is_empty() {
        return Ok(ConfigMap::new());
    }
    match serde_json::from_slice(bytes).map_err(CodecError::InvalidJson)? {
        Value::Object(map) => Ok(map),
        _ => Err(CodecError::NotAnObject),
    }
}

/// # Errors
/// Returns an error if serialization fails
pub fn to_bytes(map: &ConfigMap) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(map).map_err(CodecError::Serialize)
}

/// Remove a string value. Absent and `null` both read as `None`; a value of
/// another type stays in the map.
pub fn take_string(map: &mut ConfigMap, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Remove a string value, reading absent as empty
pub fn take_string_or_empty(map: &mut ConfigMap, key: &str) -> String {
    take_string(map, key).unwrap_or_default()
}

pub fn take_secret(map: &mut ConfigMap, key: &str) -> SecretString {
    SecretString::from(take_string_or_empty(map, key))
}

/// Remove a boolean; any other type stays in the map
pub fn take_bool(map: &mut ConfigMap, key: &str) -> Option<bool> {
    match map.remove(key)? {
        Value::Bool(b) => Some(b),
        Value::Null => None,
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Remove an array of strings. Anything else, including a mixed array,
/// stays in the map untouched.
pub fn take_string_list(map: &mut ConfigMap, key: &str) -> Vec<String> {
    match map.remove(key) {
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            map.insert(key.to_string(), other);
            Vec::new()
        }
    }
}

/// Remove an object of strings; anything else stays in the map
pub fn take_string_map(map: &mut ConfigMap, key: &str) -> BTreeMap<String, String> {
    match map.remove(key) {
        Some(Value::Object(entries)) if entries.values().all(Value::is_string) => entries
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect(),
        None | Some(Value::Null) => BTreeMap::new(),
        Some(other) => {
            map.insert(key.to_string(), other);
            BTreeMap::new()
        }
    }
}

/// Remove a nested object; any other type stays in the map
pub fn take_object(map: &mut ConfigMap, key: &str) -> Option<ConfigMap> {
    match map.remove(key)? {
        Value::Object(entries) => Some(entries),
        Value::Null => None,
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Builds the outbound config map
///
/// Empty required strings, empty lists and `None` values are omitted so that decoding
/// the output yields the same typed value again, and so that a key the typed
/// view could not read is re-emitted from the extension bucket instead of
/// being overwritten by a default.
#[derive(Debug, Default)]
pub struct ConfigBuilder(ConfigMap);

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn string(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.0.insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn secret(self, key: &str, value: &SecretString) -> Self {
        self.string(key, value.expose())
    }

    #[must_use]
    pub fn opt_string(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn bool(mut self, key: &str, value: bool) -> Self {
        self.0.insert(key.to_string(), Value::Bool(value));
        self
    }

    #[must_use]
    pub fn opt_bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(value) => self.bool(key, value),
            None => self,
        }
    }

    /// Flag that Dex defaults to `false`; only `true` is written
    #[must_use]
    pub fn flag(self, key: &str, value: bool) -> Self {
        if value {
            self.bool(key, true)
        } else {
            self
        }
    }

    #[must_use]
    pub fn list(mut self, key: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            self.0.insert(
                key.to_string(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        self
    }

    #[must_use]
    pub fn string_map(mut self, key: &str, values: &BTreeMap<String, String>) -> Self {
        if !values.is_empty() {
            self.0.insert(
                key.to_string(),
                Value::Object(
                    values
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                ),
            );
        }
        self
    }

    #[must_use]
    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Merge the extension bucket; keys already written are left alone
    #[must_use]
    pub fn extra(mut self, extra: &ConfigMap) -> Self {
        for (key, value) in extra {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
        self
    }

    #[must_use]
    pub fn build(self) -> ConfigMap {
        self.0
    }

    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        to_bytes(&self.0)
    }
}
