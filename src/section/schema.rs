//! Declarative form schemas, the editors behind each dashboard section.
//!
//! A schema knows a section's fields, their defaults and which are required.
//! It binds an item to a draft (defaults merged under the item), and turns
//! submitted form values into a request body: comma-separated lists are split,
//! numeric strings are coerced, ISO timestamps in date fields are cut to the
//! date, and required fields are checked.

use serde_json::{Map, Number, Value};

use crate::error::ValidationError;
use crate::model::Item;

/// The pluggable editing surface of a section.
pub trait Editor: Send + Sync + 'static {
    /// A draft for `item`: defaults for every known field, overridden by
    /// whatever the item carries (including fields the schema does not know).
    fn bind(&self, item: &Item) -> Item;

    /// Normalizes and validates submitted values into a request body.
    fn prepare(&self, values: Item) -> Result<Item, ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free text with a default.
    Text(&'static str),
    Date,
    /// Integer with a default.
    Number(i64),
    /// List of strings; also accepts a comma-separated string.
    List,
    Choice {
        options: &'static [&'static str],
        default: &'static str,
    },
    /// Nested object, deep-merged over its own defaults.
    Group(&'static [FieldSpec]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text(""))
    }

    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Text(default) => Value::String(default.to_string()),
            FieldKind::Date => Value::String(String::new()),
            FieldKind::Number(default) => Value::Number(default.into()),
            FieldKind::List => Value::Array(Vec::new()),
            FieldKind::Choice { default, .. } => Value::String(default.to_string()),
            FieldKind::Group(fields) => Value::Object(defaults(fields)),
        }
    }
}

/// An [`Editor`] described entirely by its fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    /// A blank draft.
    pub fn defaults(&self) -> Item {
        Item::from(defaults(self.fields))
    }
}

impl Editor for FormSchema {
    fn bind(&self, item: &Item) -> Item {
        let mut draft = defaults(self.fields);
        merge(&mut draft, self.fields, item.clone().into_map());
        Item::from(draft)
    }

    fn prepare(&self, values: Item) -> Result<Item, ValidationError> {
        let mut map = values.into_map();
        normalize(&mut map, self.fields, "")?;
        Ok(Item::from(map))
    }
}

fn defaults(fields: &[FieldSpec]) -> Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.name.to_string(), f.default_value()))
        .collect()
}

fn merge(draft: &mut Map<String, Value>, fields: &[FieldSpec], incoming: Map<String, Value>) {
    for (key, value) in incoming {
        let group = fields
            .iter()
            .find(|f| f.name == key)
            .and_then(|f| match f.kind {
                FieldKind::Group(inner) => Some(inner),
                _ => None,
            });
        match (group, value, draft.get_mut(&key)) {
            (Some(inner), Value::Object(incoming), Some(Value::Object(existing))) => {
                merge(existing, inner, incoming);
            }
            // A null group keeps its defaults.
            (Some(_), Value::Null, Some(_)) => {}
            (_, value, _) => {
                draft.insert(key, value);
            }
        }
    }
}

fn normalize(map: &mut Map<String, Value>, fields: &[FieldSpec], prefix: &str) -> Result<(), ValidationError> {
    for field in fields {
        let path = format!("{prefix}{}", field.name);
        let value = map.get_mut(field.name);

        if field.required && value.as_deref().map_or(true, is_blank) {
            return Err(ValidationError::MissingField { field: path });
        }
        let Some(value) = value else { continue };

        match field.kind {
            FieldKind::List => {
                if let Value::String(s) = value {
                    *value = Value::Array(
                        s.split(',')
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(|t| Value::String(t.to_string()))
                            .collect(),
                    );
                }
            }
            FieldKind::Number(_) => {
                if let Value::String(s) = value {
                    let s = s.trim();
                    *value = if s.is_empty() {
                        Value::Number(0.into())
                    } else if let Ok(n) = s.parse::<i64>() {
                        Value::Number(n.into())
                    } else {
                        s.parse::<f64>()
                            .ok()
                            .and_then(Number::from_f64)
                            .map(Value::Number)
                            .ok_or_else(|| ValidationError::NotANumber { field: path.clone() })?
                    };
                }
            }
            FieldKind::Date => {
                if let Value::String(s) = value {
                    if s.len() > 10 && s.as_bytes().get(4) == Some(&b'-') && s.is_char_boundary(10) {
                        s.truncate(10);
                    }
                }
            }
            FieldKind::Choice { options, .. } => {
                if let Value::String(s) = value {
                    if !s.is_empty() && !options.contains(&s.as_str()) {
                        return Err(ValidationError::InvalidChoice {
                            field: path,
                            value: s.clone(),
                        });
                    }
                }
            }
            FieldKind::Group(inner) => {
                if let Value::Object(nested) = value {
                    normalize(nested, inner, &format!("{path}."))?;
                }
            }
            FieldKind::Text(_) => {}
        }
    }
    Ok(())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NESTED: &[FieldSpec] = &[FieldSpec::text("city", "City"), FieldSpec::text("zip", "Zip")];
    const FIELDS: &[FieldSpec] = &[
        FieldSpec::text("title", "Title").required(),
        FieldSpec::new("tags", "Tags", FieldKind::List),
        FieldSpec::new("priority", "Priority", FieldKind::Number(0)),
        FieldSpec::new("startDate", "Start", FieldKind::Date),
        FieldSpec::new(
            "kind",
            "Kind",
            FieldKind::Choice {
                options: &["a", "b"],
                default: "a",
            },
        ),
        FieldSpec::new("address", "Address", FieldKind::Group(NESTED)),
    ];
    const SCHEMA: FormSchema = FormSchema::new("test", FIELDS);

    fn item(value: Value) -> Item {
        Item::from_value(value).unwrap()
    }

    #[test]
    fn bind_merges_item_over_defaults() {
        let draft = SCHEMA.bind(&item(json!({
            "_id": "1",
            "title": "T",
            "address": {"city": "Oslo"},
            "extra": true
        })));
        assert_eq!(
            Value::from(draft),
            json!({
                "_id": "1",
                "title": "T",
                "tags": [],
                "priority": 0,
                "startDate": "",
                "kind": "a",
                "address": {"city": "Oslo", "zip": ""},
                "extra": true
            })
        );
    }

    #[test]
    fn prepare_normalizes_lists_numbers_and_dates() {
        let body = SCHEMA
            .prepare(item(json!({
                "title": "T",
                "tags": " rust, tokio ,, ",
                "priority": "",
                "startDate": "2024-03-01T00:00:00.000Z"
            })))
            .unwrap();
        assert_eq!(body.get("tags"), Some(&json!(["rust", "tokio"])));
        assert_eq!(body.get("priority"), Some(&json!(0)));
        assert_eq!(body.get("startDate"), Some(&json!("2024-03-01")));

        let body = SCHEMA.prepare(item(json!({"title": "T", "priority": " 7 "}))).unwrap();
        assert_eq!(body.get("priority"), Some(&json!(7)));
    }

    #[test]
    fn prepare_rejects_missing_required_and_bad_values() {
        assert_eq!(
            SCHEMA.prepare(item(json!({"title": "  "}))),
            Err(ValidationError::MissingField { field: "title".into() })
        );
        assert_eq!(
            SCHEMA.prepare(item(json!({"title": "T", "priority": "lots"}))),
            Err(ValidationError::NotANumber { field: "priority".into() })
        );
        assert!(matches!(
            SCHEMA.prepare(item(json!({"title": "T", "kind": "z"}))),
            Err(ValidationError::InvalidChoice { .. })
        ));
    }
}
