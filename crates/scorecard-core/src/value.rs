//! Open-ended document values.
//!
//! Stored instrument documents are key/value bags whose fields may hold
//! scalars, arrays or nested bags. [`DocValue`] models them as a tagged union
//! with total accessors: every accessor returns a documented default instead
//! of failing on a type mismatch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parse::{self, canonical_label};

/// A document value: null, string, number, array or map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum DocValue {
    /// Absent or explicit null.
    #[default]
    Null,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Ordered sequence of values.
    Array(Vec<DocValue>),
    /// Keyed bag of values.
    Map(BTreeMap<String, DocValue>),
}

impl DocValue {
    /// Creates an empty map value.
    #[must_use]
    pub const fn map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Returns true for [`DocValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to a float: strings are parsed leniently, numbers pass
    /// through, everything else is `0.0`.
    #[must_use]
    pub fn to_float(&self) -> f64 {
        match self {
            Self::String(s) => parse::to_float(s),
            Self::Number(n) => *n,
            _ => 0.0,
        }
    }

    /// Renders a scalar as text: numbers are formatted, null and
    /// containers become the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Collects the string elements of an array. Non-string elements are
    /// skipped; a non-array yields an empty vector.
    #[must_use]
    pub fn to_string_array(&self) -> Vec<String> {
        match self {
            Self::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Looks up a key in a map value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the map entries, or an empty map for other values.
    #[must_use]
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Self)> {
        let map = match self {
            Self::Map(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|m| m.iter())
    }

    /// Returns the array elements, or an empty slice for other values.
    #[must_use]
    pub fn items(&self) -> &[Self] {
        match self {
            Self::Array(items) => items,
            _ => &[],
        }
    }

    /// Walks nested maps along `keys`.
    ///
    /// Each key is trimmed and canonicalized with [`canonical_label`], so
    /// `"Net Profit +"` finds the stored `"Net Profit\u{a0}+"` entry.
    #[must_use]
    pub fn path(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter()
            .try_fold(self, |current, key| current.get(&canonical_label(key)))
    }

    /// Nested-path lookup of an array; any miss yields an empty slice.
    #[must_use]
    pub fn array_at(&self, keys: &[&str]) -> &[Self] {
        match self.path(keys) {
            Some(value) => value.items(),
            None => &[],
        }
    }

    /// Inserts into a map value, turning a non-map into an empty map first.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Self>) {
        if !matches!(self, Self::Map(_)) {
            *self = Self::map();
        }
        if let Self::Map(map) = self {
            map.insert(key.into(), value.into());
        }
    }
}

impl From<serde_json::Value> for DocValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::String(b.to_string()),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<DocValue> for serde_json::Value {
    fn from(value: DocValue) -> Self {
        match value {
            DocValue::Null => Self::Null,
            DocValue::String(s) => Self::String(s),
            DocValue::Number(n) => serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number),
            DocValue::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            DocValue::Map(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for DocValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DocValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for DocValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl<T: Into<Self>> From<Vec<T>> for DocValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<BTreeMap<String, T>> for DocValue {
    fn from(map: BTreeMap<String, T>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl FromIterator<(String, Self)> for DocValue {
    fn from_iter<I: IntoIterator<Item = (String, Self)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}
