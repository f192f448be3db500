//! Typed preference maps
//!
//! Members submit free-form preference payloads. They are normalized at
//! ingestion into `key → ordered set of values`: nested objects are
//! flattened into dotted keys, scalars become strings, blanks and duplicates
//! are dropped. Nothing downstream ever sees a nested shape.

use crate::{PartyError, PartyResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A normalized preference mapping.
///
/// Keys and values are kept in lexicographic order, so two maps with the
/// same content compare and serialize identically.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(BTreeMap<String, BTreeSet<String>>);

/// The union of every qualifying member's preferences.
pub type AggregatedPreferences = Preferences;

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of several values under one key.
    pub fn with<I, S>(mut self, key: impl AsRef<str>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            self.insert(key.as_ref(), value.as_ref());
        }
        self
    }

    /// Insert one value, trimming both sides. Blank keys or values are ignored.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.0
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string())
    }

    /// Normalize an untyped JSON payload.
    ///
    /// The top level must be an object. `{"genres": ["drama"], "era": {"from": 1990}}`
    /// becomes `{"era.from": {"1990"}, "genres": {"drama"}}`.
    pub fn from_json(payload: &Value) -> PartyResult<Self> {
        let Value::Object(fields) = payload else {
            return Err(PartyError::Validation(
                "preferences must be a JSON object".into(),
            ));
        };

        let mut prefs = Self::new();
        for (key, value) in fields {
            prefs.ingest(key.trim(), value);
        }
        Ok(prefs)
    }

    fn ingest(&mut self, key: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.insert(key, if *b { "true" } else { "false" });
            }
            Value::Number(n) => {
                self.insert(key, &n.to_string());
            }
            Value::String(s) => {
                self.insert(key, s);
            }
            Value::Array(items) => {
                for item in items {
                    self.ingest(key, item);
                }
            }
            Value::Object(fields) => {
                for (child, value) in fields {
                    let child = child.trim();
                    if child.is_empty() {
                        continue;
                    }
                    let nested = if key.is_empty() {
                        child.to_string()
                    } else {
                        format!("{key}.{child}")
                    };
                    self.ingest(&nested, value);
                }
            }
        }
    }

    /// Union another map into this one.
    pub fn merge(&mut self, other: &Preferences) {
        for (key, values) in &other.0 {
            self.0
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.0.get(key)
    }

    /// Values under `key` in lexicographic order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }

    /// Every value under every key.
    pub fn all_values(&self) -> BTreeSet<&str> {
        self.0
            .values()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
