//! Domain value → wire field encoding.

use crate::model::document::PropertyMap;
use crate::model::property::{PropertyDescriptor, PropertyType, PropertyValue};
use serde_json::{json, Map, Value};

/// Encodes one descriptor into a single-entry field fragment
/// `{name: {tag: payload}}`.
pub fn encode(descriptor: &PropertyDescriptor) -> PropertyMap {
    let mut fragment = Map::new();
    let mut body = Map::new();
    body.insert(
        descriptor.kind.as_wire().to_string(),
        encode_payload(descriptor.kind, &descriptor.value),
    );
    fragment.insert(descriptor.name.clone(), Value::Object(body));
    fragment
}

/// Encodes descriptors independently and merges them by field name.
///
/// Duplicate names are not guarded: the last descriptor wins.
pub fn encode_all<'a, I>(descriptors: I) -> PropertyMap
where
    I: IntoIterator<Item = &'a PropertyDescriptor>,
{
    let mut properties = Map::new();
    for descriptor in descriptors {
        properties.extend(encode(descriptor));
    }
    properties
}

/// Encodes the payload placed under the type tag.
pub fn encode_payload(kind: PropertyType, value: &PropertyValue) -> Value {
    match kind {
        PropertyType::Title | PropertyType::RichText => text_segments(value),
        PropertyType::Select | PropertyType::Status => match value {
            PropertyValue::Null => Value::Null,
            PropertyValue::Text(name) => json!({ "name": name }),
            other => json!({ "name": other.to_wire() }),
        },
        PropertyType::MultiSelect => keyed_list("name", value),
        PropertyType::Relation => keyed_list("id", value),
        PropertyType::Date => match value {
            PropertyValue::DateTime(at) => json!({ "start": at.to_rfc3339() }),
            other => other.to_wire(),
        },
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
        | PropertyType::LastEditedTime
        | PropertyType::LastEditedBy => value.to_wire(),
    }
}

fn text_segments(value: &PropertyValue) -> Value {
    let content = match value {
        PropertyValue::Null => return Value::Array(Vec::new()),
        PropertyValue::Text(text) => Value::String(text.clone()),
        other => other.to_wire(),
    };
    json!([{ "text": { "content": content } }])
}

fn keyed_list(key: &str, value: &PropertyValue) -> Value {
    match value.to_string_list() {
        Some(items) => Value::Array(
            items
                .into_iter()
                .map(|item| {
                    let mut entry = Map::new();
                    entry.insert(key.to_string(), Value::String(item));
                    Value::Object(entry)
                })
                .collect(),
        ),
        None => {
            let mut entry = Map::new();
            entry.insert(key.to_string(), value.to_wire());
            Value::Array(vec![Value::Object(entry)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{encode, encode_all};
    use crate::model::property::{PropertyDescriptor, PropertyType, PropertyValue};
    use serde_json::{json, Value};

    fn encoded(descriptor: PropertyDescriptor) -> Value {
        Value::Object(encode(&descriptor))
    }

    #[test]
    fn select_wraps_name() {
        let fragment = encoded(PropertyDescriptor::new(
            "Status",
            PropertyType::Select,
            "Active",
        ));
        assert_eq!(fragment, json!({"Status": {"select": {"name": "Active"}}}));
    }

    #[test]
    fn title_is_single_text_segment() {
        let fragment = encoded(PropertyDescriptor::title("Name", "Test3"));
        assert_eq!(
            fragment,
            json!({"Name": {"title": [{"text": {"content": "Test3"}}]}})
        );
    }

    #[test]
    fn rich_text_is_single_text_segment() {
        let fragment = encoded(PropertyDescriptor::new("Notes", PropertyType::RichText, "hi"));
        assert_eq!(
            fragment,
            json!({"Notes": {"rich_text": [{"text": {"content": "hi"}}]}})
        );
    }

    #[test]
    fn multi_select_maps_every_element() {
        let fragment = encoded(PropertyDescriptor::new(
            "Assign",
            PropertyType::MultiSelect,
            vec!["ann", "bob"],
        ));
        assert_eq!(
            fragment,
            json!({"Assign": {"multi_select": [{"name": "ann"}, {"name": "bob"}]}})
        );
    }

    #[test]
    fn relation_accepts_scalar_or_list() {
        let single = encoded(PropertyDescriptor::new("Owner", PropertyType::Relation, "p-1"));
        assert_eq!(single, json!({"Owner": {"relation": [{"id": "p-1"}]}}));

        let many = encoded(PropertyDescriptor::new(
            "Owner",
            PropertyType::Relation,
            vec!["p-1", "p-2"],
        ));
        assert_eq!(
            many,
            json!({"Owner": {"relation": [{"id": "p-1"}, {"id": "p-2"}]}})
        );
    }

    #[test]
    fn null_clears_choice_and_lists() {
        assert_eq!(
            encoded(PropertyDescriptor::new("S", PropertyType::Select, PropertyValue::Null)),
            json!({"S": {"select": null}})
        );
        assert_eq!(
            encoded(PropertyDescriptor::new("M", PropertyType::MultiSelect, PropertyValue::Null)),
            json!({"M": {"multi_select": []}})
        );
        assert_eq!(
            encoded(PropertyDescriptor::new("T", PropertyType::RichText, PropertyValue::Null)),
            json!({"T": {"rich_text": []}})
        );
    }

    #[test]
    fn other_tags_pass_through() {
        assert_eq!(
            encoded(PropertyDescriptor::new("Price", PropertyType::Number, 100_i64)),
            json!({"Price": {"number": 100}})
        );
        assert_eq!(
            encoded(PropertyDescriptor::new("Exists", PropertyType::Checkbox, true)),
            json!({"Exists": {"checkbox": true}})
        );
        let date = json!({"start": "2024-03-01", "end": null});
        assert_eq!(
            encoded(PropertyDescriptor::new(
                "Due",
                PropertyType::Date,
                PropertyValue::Raw(date.clone())
            )),
            json!({"Due": {"date": date}})
        );
    }

    #[test]
    fn encode_all_merges_and_last_duplicate_wins() {
        let descriptors = vec![
            PropertyDescriptor::title("Name", "a"),
            PropertyDescriptor::new("Price", PropertyType::Number, 1_i64),
            PropertyDescriptor::new("Price", PropertyType::Number, 2_i64),
        ];
        let properties = encode_all(&descriptors);
        assert_eq!(properties.len(), 2);
        assert_eq!(properties["Price"], json!({"number": 2}));
    }
}
