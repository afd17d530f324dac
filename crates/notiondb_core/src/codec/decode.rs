//! Wire field → domain value decoding.

use super::{CodecError, CodecResult};
use crate::model::document::Document;
use crate::model::property::{PropertyType, PropertyValue};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Remote timestamp layout, `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

static NULL: Value = Value::Null;

/// Reads the declared type tag of `name` in `document`.
pub fn declared_type(document: &Document, name: &str) -> CodecResult<PropertyType> {
    let field = document
        .field(name)
        .ok_or_else(|| CodecError::FieldNotFound(name.to_string()))?;
    let tag = field
        .get("type")
        .and_then(Value::as_str)
        .ok_or(CodecError::InvalidShape {
            field: name.to_string(),
            expected: "an object with a `type` tag",
        })?;
    PropertyType::from_wire(tag).ok_or_else(|| CodecError::UnknownType {
        field: name.to_string(),
        tag: tag.to_string(),
    })
}

/// Decodes field `name` of `document` into its domain value.
///
/// # Errors
/// - `FieldNotFound` when the document has no such field.
/// - `UnknownType` when the declared tag is outside the taxonomy.
/// - `Parse` when a last-edited timestamp is malformed.
/// - `InvalidShape` when the payload does not match its tag.
pub fn decode(document: &Document, name: &str) -> CodecResult<PropertyValue> {
    let kind = declared_type(document, name)?;
    let field = document
        .field(name)
        .ok_or_else(|| CodecError::FieldNotFound(name.to_string()))?;
    let payload = field.get(kind.as_wire()).unwrap_or(&NULL);

    match kind {
        PropertyType::Title => concat_segments(name, payload, |segment| {
            segment.get("text").and_then(|text| text.get("content"))
        }),
        PropertyType::RichText => {
            concat_segments(name, payload, |segment| segment.get("plain_text"))
        }
        PropertyType::Select | PropertyType::Status => match payload {
            Value::Null => Ok(PropertyValue::Null),
            Value::Object(choice) if choice.is_empty() => Ok(PropertyValue::Null),
            choice => choice_name(name, choice).map(PropertyValue::Text),
        },
        PropertyType::MultiSelect => match payload {
            Value::Null => Ok(PropertyValue::List(Vec::new())),
            choices => list_entries(name, choices, "name", "a list of `{name}` choices")
                .map(PropertyValue::List),
        },
        PropertyType::Relation => {
            let ids = match payload {
                Value::Null => Vec::new(),
                related => list_entries(name, related, "id", "a list of `{id}` references")?,
            };
            let has_more = field.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            if has_more {
                // Partial view: only the ids present in this snapshot.
                return Ok(PropertyValue::List(ids));
            }
            Ok(ids
                .into_iter()
                .next()
                .map(PropertyValue::Text)
                .unwrap_or(PropertyValue::Null))
        }
        PropertyType::LastEditedTime => match payload {
            Value::String(raw) => parse_timestamp(name, raw).map(PropertyValue::DateTime),
            Value::Null => Ok(PropertyValue::Null),
            _ => Err(CodecError::InvalidShape {
                field: name.to_string(),
                expected: "a timestamp string",
            }),
        },
        PropertyType::Date => Ok(decode_date(payload)),
        PropertyType::Number
        | PropertyType::People
        | PropertyType::Files
        | PropertyType::Checkbox
        | PropertyType::Url
        | PropertyType::Email
        | PropertyType::PhoneNumber
        | PropertyType::Formula
        | PropertyType::Rollup
        | PropertyType::CreatedTime
        | PropertyType::CreatedBy
        | PropertyType::LastEditedBy => Ok(PropertyValue::from_wire(payload.clone())),
    }
}

/// Parses a remote timestamp string as UTC.
pub fn parse_timestamp(field: &str, raw: &str) -> CodecResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| CodecError::Parse {
            field: field.to_string(),
            value: raw.to_string(),
            source,
        })
}

/// A `{start}` date holding a full timestamp and no end decodes to
/// `DateTime`, matching what the encoder writes for it. Date-only values and
/// ranges stay `Raw`.
fn decode_date(payload: &Value) -> PropertyValue {
    let instant = payload.as_object().and_then(|date| {
        let end_is_unset = date.get("end").map_or(true, Value::is_null);
        let start = date.get("start")?.as_str()?;
        if !end_is_unset {
            return None;
        }
        DateTime::parse_from_rfc3339(start).ok()
    });
    match instant {
        Some(at) => PropertyValue::DateTime(at.with_timezone(&Utc)),
        None => PropertyValue::from_wire(payload.clone()),
    }
}

fn concat_segments<'v, F>(name: &str, payload: &'v Value, text_of: F) -> CodecResult<PropertyValue>
where
    F: Fn(&'v Value) -> Option<&'v Value>,
{
    let segments = match payload {
        Value::Null => return Ok(PropertyValue::Text(String::new())),
        Value::Array(segments) => segments,
        _ => {
            return Err(CodecError::InvalidShape {
                field: name.to_string(),
                expected: "a list of text segments",
            })
        }
    };

    let mut joined = String::new();
    for segment in segments {
        let text = text_of(segment)
            .and_then(Value::as_str)
            .ok_or(CodecError::InvalidShape {
                field: name.to_string(),
                expected: "text segments with string content",
            })?;
        joined.push_str(text);
    }
    Ok(PropertyValue::Text(joined))
}

fn choice_name(name: &str, choice: &Value) -> CodecResult<String> {
    choice
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(CodecError::InvalidShape {
            field: name.to_string(),
            expected: "a `{name}` choice",
        })
}

fn list_entries(
    name: &str,
    payload: &Value,
    key: &str,
    expected: &'static str,
) -> CodecResult<Vec<String>> {
    let invalid = || CodecError::InvalidShape {
        field: name.to_string(),
        expected,
    };
    payload
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|entry| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(invalid)
        })
        .collect()
}
