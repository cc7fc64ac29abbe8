//! The persisted per-domain speed record.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::{DomainKey, SpeedValue};

/// Store key under which the whole [`DomainSpeedMap`] lives.
pub const DOMAIN_SPEEDS_KEY: &str = "domainSpeeds";

/// Mapping from domain to stored speed.
///
/// Stored as one JSON object `{ "<domain>": <speed>, ... }`. Absent
/// entries mean the default speed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainSpeedMap {
    entries: BTreeMap<String, f64>,
}

impl DomainSpeedMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode from the stored JSON value.
    ///
    /// Other contexts may write whatever they like, so decoding is lenient:
    /// non-object values decode as empty and non-numeric entries are dropped.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            debug!("Stored domain speeds are not an object, treating as empty");
            return Self::default();
        };

        let entries = object
            .iter()
            .filter_map(|(domain, speed)| speed.as_f64().map(|s| (domain.clone(), s)))
            .collect();
        Self { entries }
    }

    /// Encode for the store.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(domain, speed)| (domain.clone(), Value::from(*speed)))
            .collect();
        Value::Object(object)
    }

    /// Stored speed for `domain`, if a valid one exists.
    pub fn get(&self, domain: &DomainKey) -> Option<SpeedValue> {
        self.raw(domain).and_then(SpeedValue::from_request)
    }

    /// The raw stored number for `domain`, unvalidated.
    pub fn raw(&self, domain: &DomainKey) -> Option<f64> {
        self.entries.get(domain.as_str()).copied()
    }

    /// Record `speed` for `domain`, replacing any previous entry.
    pub fn insert(&mut self, domain: &DomainKey, speed: SpeedValue) {
        self.entries
            .insert(domain.as_str().to_string(), speed.persisted());
    }

    /// Drop the entry for `domain`. Returns whether one existed.
    pub fn remove(&mut self, domain: &DomainKey) -> bool {
        self.entries.remove(domain.as_str()).is_some()
    }

    /// Iterate `(domain, speed)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(domain, speed)| (domain.as_str(), *speed))
    }

    /// Number of stored domains.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
