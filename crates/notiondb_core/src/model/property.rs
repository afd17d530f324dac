//! Property type taxonomy and caller-facing property values.
//!
//! # Responsibility
//! - Define the closed set of field type tags declared by the remote store.
//! - Define the flat domain value shape callers read and write.
//!
//! # Invariants
//! - The taxonomy is closed; adding a tag is a code change.
//! - Encoding is directed by `PropertyType`, never inferred from the value.
//! - The title field is always the `Title` variant, independent of its name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared data type of one remote field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Primary title field. Text-segment list on the wire.
    Title,
    /// Free text. Text-segment list on the wire.
    RichText,
    Number,
    /// Single choice, `{name}` or null.
    Select,
    /// Ordered list of `{name}`.
    MultiSelect,
    /// Workflow status. Same wire shape as `Select`.
    Status,
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula,
    /// Ordered list of `{id}` plus a `has_more` truncation flag.
    Relation,
    Rollup,
    CreatedTime,
    CreatedBy,
    /// Remote-maintained timestamp string.
    LastEditedTime,
    LastEditedBy,
}

impl PropertyType {
    /// Every tag in declaration order.
    pub const ALL: [PropertyType; 20] = [
        PropertyType::Title,
        PropertyType::RichText,
        PropertyType::Number,
        PropertyType::Select,
        PropertyType::MultiSelect,
        PropertyType::Status,
        PropertyType::Date,
        PropertyType::People,
        PropertyType::Files,
        PropertyType::Checkbox,
        PropertyType::Url,
        PropertyType::Email,
        PropertyType::PhoneNumber,
        PropertyType::Formula,
        PropertyType::Relation,
        PropertyType::Rollup,
        PropertyType::CreatedTime,
        PropertyType::CreatedBy,
        PropertyType::LastEditedTime,
        PropertyType::LastEditedBy,
    ];

    /// Returns the wire tag used as the payload key inside a field.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Status => "status",
            Self::Date => "date",
            Self::People => "people",
            Self::Files => "files",
            Self::Checkbox => "checkbox",
            Self::Url => "url",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Formula => "formula",
            Self::Relation => "relation",
            Self::Rollup => "rollup",
            Self::CreatedTime => "created_time",
            Self::CreatedBy => "created_by",
            Self::LastEditedTime => "last_edited_time",
            Self::LastEditedBy => "last_edited_by",
        }
    }

    /// Parses a wire tag. Returns `None` for tags outside the taxonomy.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_wire() == value)
    }

    /// Whether the remote store computes this field itself.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Self::Formula
                | Self::Rollup
                | Self::CreatedTime
                | Self::CreatedBy
                | Self::LastEditedTime
                | Self::LastEditedBy
        )
    }
}

/// Flat caller-facing value of one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Choice names or related document ids.
    List(Vec<String>),
    DateTime(DateTime<Utc>),
    /// Wire value with no flat representation, e.g. a date object.
    Raw(Value),
}

impl PropertyValue {
    /// Converts a pass-through wire value into its flat form.
    ///
    /// Only non-empty arrays of strings flatten to `List`; an empty array
    /// stays `Raw` so empty and populated object lists share one shape.
    pub fn from_wire(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => match number.as_f64() {
                Some(number) => Self::Number(number),
                None => Self::Raw(Value::Number(number)),
            },
            Value::String(text) => Self::Text(text),
            Value::Array(items)
                if !items.is_empty() && items.iter().all(Value::is_string) =>
            {
                Self::List(
                    items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(text) => Some(text),
                            _ => None,
                        })
                        .collect(),
                )
            }
            other => Self::Raw(other),
        }
    }

    /// Converts this value into the JSON it passes through as.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(number) => number_to_wire(*number),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::DateTime(at) => Value::String(at.to_rfc3339()),
            Self::Raw(value) => value.clone(),
        }
    }

    /// Returns the value as a list of strings.
    ///
    /// A single text value becomes a one-element list and `Null` becomes
    /// empty; other shapes have no string-list form.
    pub fn to_string_list(&self) -> Option<Vec<String>> {
        match self {
            Self::Null => Some(Vec::new()),
            Self::Text(text) => Some(vec![text.clone()]),
            Self::List(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Renders an identifying value as a cache key.
    ///
    /// Integral numbers render without a fractional part so `42` and `42.0`
    /// map to the same key.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text.clone()),
            Self::Number(number) if number.is_finite() => {
                if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
                    Some(format!("{}", *number as i64))
                } else {
                    Some(number.to_string())
                }
            }
            _ => None,
        }
    }
}

fn number_to_wire(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        return Value::from(number as i64);
    }
    serde_json::Number::from_f64(number)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// Unit of encode input: one named, typed field value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyType,
    pub value: PropertyValue,
}

impl PropertyDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: PropertyType,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
        }
    }

    /// Describes the title field. Title encoding does not depend on `name`.
    pub fn title(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Title, PropertyValue::Text(value.into()))
    }
}
