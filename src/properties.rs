//! Canonical custom property values.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::extract::normalize_fallback;

/// Mapping from custom property name to its canonical value.
///
/// Values are stored normalized, so a canonical value written across
/// several lines compares equal to the same fallback written on one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    entries: BTreeMap<String, String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON object of `"--name": "value"` pairs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;

        if let Some(key) = raw.keys().find(|key| !key.starts_with("--")) {
            return Err(Error::InvalidProperties(format!(
                "'{key}' is not a custom property name"
            )));
        }

        Ok(raw.into_iter().collect())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Insert a canonical value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) -> Option<String> {
        self.entries
            .insert(key.into(), normalize_fallback(value.as_ref()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyTable
where
    K: Into<String>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}
