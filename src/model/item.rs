//! Schema-less resource items and their generic display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying the server-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// Server-managed fields that never show up in the generic view and are never
/// sent back in a request body.
pub const METADATA_FIELDS: &[&str] = &[
    "_id",
    "id",
    "__v",
    "_rev",
    "createdAt",
    "updatedAt",
    "created_at",
    "updated_at",
    "version",
    "_version",
    "lastModified",
    "last_modified",
];

/// One record of a section: a field-name to value mapping whose shape is
/// decided by the section. Carries `_id` once the server has persisted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object; anything else is not an item.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style insert, handy for tests and form defaults.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Server identifier. Numeric ids are rendered as strings.
    pub fn id(&self) -> Option<String> {
        match self.0.get(ID_FIELD)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Copy with every server-managed field removed.
    pub fn without_metadata(&self) -> Item {
        Item(
            self.0
                .iter()
                .filter(|(k, _)| !is_metadata(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Every non-metadata field, in item order, ready for a generic card.
    pub fn display_fields(&self) -> Vec<DisplayField> {
        self.0
            .iter()
            .filter(|(k, _)| !is_metadata(k))
            .map(|(k, v)| DisplayField {
                name: k.clone(),
                value: DisplayValue::of(k, v),
            })
            .collect()
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Value::Object(item.0)
    }
}

/// The fixed list above, plus any timestamp named like `deletedAt` or
/// `published_at`.
pub fn is_metadata(field: &str) -> bool {
    METADATA_FIELDS.contains(&field) || is_timestamp_name(field)
}

fn is_timestamp_name(field: &str) -> bool {
    if let Some(stem) = field.strip_suffix("_at") {
        return !stem.is_empty();
    }
    field
        .strip_suffix("At")
        .and_then(|stem| stem.chars().last())
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayField {
    pub name: String,
    pub value: DisplayValue,
}

/// How one field is rendered on a dashboard card.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    /// Arrays, one chip per element.
    Tags(Vec<String>),
    /// Proficiency-like numbers, clamped to 0..=100.
    Meter(u8),
    Text(String),
}

impl DisplayValue {
    fn of(name: &str, value: &Value) -> Self {
        match value {
            Value::Array(values) => DisplayValue::Tags(values.iter().map(plain).collect()),
            _ if name.to_lowercase().contains("proficiency") => {
                let pct = match value {
                    Value::Number(n) => n.as_f64().unwrap_or(0.0),
                    Value::String(s) => s.trim().parse().unwrap_or(0.0),
                    _ => 0.0,
                };
                DisplayValue::Meter(pct.clamp(0.0, 100.0).round() as u8)
            }
            other => DisplayValue::Text(plain(other)),
        }
    }
}

// Strings without quotes, objects as compact JSON.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
