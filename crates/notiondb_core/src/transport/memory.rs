//! In-process transport backed by in-memory collections.
//!
//! # Responsibility
//! - Stand in for the remote store in tests and offline smoke runs.
//! - Mirror the remote store's validation and response shapes.
//!
//! # Invariants
//! - Every submitted field must exist in the collection schema with the
//!   same type tag; otherwise the call is rejected.
//! - Responses always carry every schema field with a `type` tag.
//! - Archived documents are excluded from listings but never removed.

use super::{DocumentPage, DocumentPatch, DocumentTransport, TransportError, TransportResult};
use crate::model::document::{Document, DocumentId, PropertyMap};
use crate::model::property::PropertyType;
use chrono::Utc;
use log::debug;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Remote listing page size.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Field name → declared type for one collection.
pub type CollectionSchema = BTreeMap<String, PropertyType>;

#[derive(Default)]
struct Collection {
    schema: CollectionSchema,
    order: Vec<DocumentId>,
}

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Collection>,
    documents: BTreeMap<DocumentId, (String, Document)>,
    create_calls: usize,
    update_calls: usize,
    query_calls: usize,
    pending_failure: Option<TransportError>,
}

/// In-memory `DocumentTransport`.
pub struct MemoryTransport {
    page_size: usize,
    state: Mutex<State>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates a transport whose listings return `page_size` documents per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Mutex::new(State::default()),
        }
    }

    /// Registers an empty collection with its field schema.
    pub fn register_collection<I, S>(&self, collection_id: &str, schema: I) -> TransportResult<()>
    where
        I: IntoIterator<Item = (S, PropertyType)>,
        S: Into<String>,
    {
        let mut state = self.lock()?;
        if state.collections.contains_key(collection_id) {
            return Err(TransportError::Validation(format!(
                "collection already exists: {collection_id}"
            )));
        }
        let schema = schema
            .into_iter()
            .map(|(name, kind)| (name.into(), kind))
            .collect();
        state.collections.insert(
            collection_id.to_string(),
            Collection {
                schema,
                order: Vec::new(),
            },
        );
        Ok(())
    }

    /// Returns the current stored copy of one document.
    pub fn document(&self, document_id: &str) -> Option<Document> {
        let state = self.lock().ok()?;
        state
            .documents
            .get(document_id)
            .map(|(_, document)| document.clone())
    }

    pub fn create_calls(&self) -> usize {
        self.lock().map(|state| state.create_calls).unwrap_or(0)
    }

    pub fn update_calls(&self) -> usize {
        self.lock().map(|state| state.update_calls).unwrap_or(0)
    }

    pub fn query_calls(&self) -> usize {
        self.lock().map(|state| state.query_calls).unwrap_or(0)
    }

    /// Makes the next remote call fail with `error`.
    pub fn fail_next(&self, error: TransportError) {
        if let Ok(mut state) = self.lock() {
            state.pending_failure = Some(error);
        }
    }

    fn lock(&self) -> TransportResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| TransportError::Backend("memory transport lock poisoned".to_string()))
    }

    fn begin(&self) -> TransportResult<MutexGuard<'_, State>> {
        let mut state = self.lock()?;
        if let Some(error) = state.pending_failure.take() {
            return Err(error);
        }
        Ok(state)
    }
}

impl DocumentTransport for MemoryTransport {
    fn create_document(
        &self,
        collection_id: &str,
        properties: PropertyMap,
    ) -> TransportResult<Document> {
        let mut state = self.begin()?;
        state.create_calls += 1;
        let collection = state
            .collections
            .get(collection_id)
            .ok_or_else(|| TransportError::NotFound(collection_id.to_string()))?;

        let now = now_timestamp();
        let mut stored = Map::new();
        for (name, kind) in &collection.schema {
            stored.insert(name.clone(), empty_field(*kind, &now));
        }
        apply_properties(&collection.schema, &mut stored, properties)?;

        let id = Uuid::new_v4().to_string();
        let mut document = Document::new(id.clone(), stored);
        document.extra.insert("object".to_string(), json!("page"));
        document.extra.insert(
            "parent".to_string(),
            json!({ "type": "database_id", "database_id": collection_id }),
        );
        document
            .extra
            .insert("created_time".to_string(), Value::String(now.clone()));
        document
            .extra
            .insert("last_edited_time".to_string(), Value::String(now));

        if let Some(collection) = state.collections.get_mut(collection_id) {
            collection.order.push(id.clone());
        }
        state
            .documents
            .insert(id.clone(), (collection_id.to_string(), document.clone()));
        debug!(
            "event=memory_create module=transport status=ok collection={} document={}",
            collection_id, id
        );
        Ok(document)
    }

    fn update_document(
        &self,
        document_id: &str,
        patch: &DocumentPatch,
    ) -> TransportResult<Document> {
        let mut state = self.begin()?;
        state.update_calls += 1;
        let (collection_id, current) = state
            .documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(document_id.to_string()))?;
        let schema = state
            .collections
            .get(&collection_id)
            .map(|collection| collection.schema.clone())
            .ok_or_else(|| TransportError::NotFound(collection_id.clone()))?;

        if current.archived && patch.archived != Some(false) && patch.properties.is_some() {
            return Err(TransportError::Validation(format!(
                "cannot edit archived document {document_id}"
            )));
        }

        let mut document = current;
        if let Some(properties) = &patch.properties {
            apply_properties(&schema, &mut document.properties, properties.clone())?;
        }
        if let Some(archived) = patch.archived {
            document.archived = archived;
        }
        let now = now_timestamp();
        touch_last_edited(&schema, &mut document.properties, &now);
        document
            .extra
            .insert("last_edited_time".to_string(), Value::String(now));

        state
            .documents
            .insert(document_id.to_string(), (collection_id, document.clone()));
        debug!("event=memory_update module=transport status=ok document={document_id}");
        Ok(document)
    }

    fn query_page(
        &self,
        collection_id: &str,
        start_cursor: Option<&str>,
    ) -> TransportResult<DocumentPage> {
        let mut state = self.begin()?;
        state.query_calls += 1;
        let collection = state
            .collections
            .get(collection_id)
            .ok_or_else(|| TransportError::NotFound(collection_id.to_string()))?;
        let start = match start_cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| {
                TransportError::Validation(format!("invalid start cursor `{cursor}`"))
            })?,
            None => 0,
        };

        let live: Vec<&Document> = collection
            .order
            .iter()
            .filter_map(|id| state.documents.get(id))
            .map(|(_, document)| document)
            .filter(|document| !document.archived)
            .collect();
        let end = start.saturating_add(self.page_size).min(live.len());
        let results = live
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|document| (*document).clone())
            .collect();
        let has_more = end < live.len();

        Ok(DocumentPage {
            results,
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }
}

fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn empty_field(kind: PropertyType, now: &str) -> Value {
    let payload = match kind {
        PropertyType::Title
        | PropertyType::RichText
        | PropertyType::MultiSelect
        | PropertyType::Relation
        | PropertyType::People
        | PropertyType::Files => json!([]),
        PropertyType::Checkbox => json!(false),
        PropertyType::CreatedTime | PropertyType::LastEditedTime => json!(now),
        _ => Value::Null,
    };
    wrap_field(kind, payload)
}

fn wrap_field(kind: PropertyType, payload: Value) -> Value {
    let mut field = Map::new();
    field.insert("type".to_string(), json!(kind.as_wire()));
    field.insert(kind.as_wire().to_string(), payload);
    if kind == PropertyType::Relation {
        field.insert("has_more".to_string(), json!(false));
    }
    Value::Object(field)
}

fn apply_properties(
    schema: &CollectionSchema,
    stored: &mut PropertyMap,
    properties: PropertyMap,
) -> TransportResult<()> {
    for (name, body) in properties {
        let kind = *schema
            .get(&name)
            .ok_or_else(|| TransportError::Validation(format!("unknown property `{name}`")))?;
        if kind.is_read_only() {
            return Err(TransportError::Validation(format!(
                "property `{name}` is read-only"
            )));
        }
        let payload = match body {
            Value::Object(mut body) if body.len() == 1 => {
                body.remove(kind.as_wire()).ok_or_else(|| {
                    TransportError::Validation(format!(
                        "property `{name}` expects `{}`",
                        kind.as_wire()
                    ))
                })?
            }
            _ => {
                return Err(TransportError::Validation(format!(
                    "property `{name}` must be a single tagged value"
                )))
            }
        };
        let payload = normalize_payload(&name, kind, payload)?;
        stored.insert(name, wrap_field(kind, payload));
    }
    Ok(())
}

fn normalize_payload(name: &str, kind: PropertyType, payload: Value) -> TransportResult<Value> {
    let invalid = |expected: &str| {
        TransportError::Validation(format!("property `{name}` must be {expected}"))
    };
    match kind {
        PropertyType::Title | PropertyType::RichText => {
            let segments = payload
                .as_array()
                .ok_or_else(|| invalid("a list of text segments"))?;
            segments
                .iter()
                .map(|segment| {
                    let content = segment
                        .get("text")
                        .and_then(|text| text.get("content"))
                        .and_then(Value::as_str)
                        .ok_or_else(|| invalid("text segments with string content"))?;
                    Ok(json!({
                        "type": "text",
                        "text": { "content": content, "link": null },
                        "plain_text": content,
                    }))
                })
                .collect::<TransportResult<Vec<_>>>()
                .map(Value::Array)
        }
        PropertyType::Select | PropertyType::Status => match &payload {
            Value::Null => Ok(Value::Null),
            Value::Object(choice) => match choice.get("name").and_then(Value::as_str) {
                Some(choice) => Ok(json!({ "name": choice })),
                None => Err(invalid("a `{name}` choice")),
            },
            _ => Err(invalid("a `{name}` choice")),
        },
        PropertyType::MultiSelect => {
            keyed_entries(&payload, "name").ok_or_else(|| invalid("a list of `{name}` choices"))
        }
        PropertyType::Relation => {
            keyed_entries(&payload, "id").ok_or_else(|| invalid("a list of `{id}` references"))
        }
        PropertyType::Number => match payload {
            Value::Null | Value::Number(_) => Ok(payload),
            _ => Err(invalid("a number")),
        },
        PropertyType::Checkbox => match payload {
            Value::Bool(_) => Ok(payload),
            _ => Err(invalid("a boolean")),
        },
        _ => Ok(payload),
    }
}

fn keyed_entries(payload: &Value, key: &str) -> Option<Value> {
    payload
        .as_array()?
        .iter()
        .map(|entry| {
            let value = entry.get(key)?.as_str()?;
            let mut normalized = Map::new();
            normalized.insert(key.to_string(), json!(value));
            Some(Value::Object(normalized))
        })
        .collect::<Option<Vec<_>>>()
        .map(Value::Array)
}

fn touch_last_edited(schema: &CollectionSchema, stored: &mut PropertyMap, now: &str) {
    for (name, kind) in schema {
        if *kind == PropertyType::LastEditedTime {
            stored.insert(name.clone(), wrap_field(*kind, json!(now)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTransport;
    use crate::model::property::PropertyType;
    use crate::transport::{DocumentPatch, DocumentTransport, TransportError};
    use serde_json::{json, Map, Value};

    fn transport() -> MemoryTransport {
        let transport = MemoryTransport::with_page_size(2);
        transport
            .register_collection(
                "db-1",
                [
                    ("Name", PropertyType::Title),
                    ("Status", PropertyType::Select),
                    ("Owner", PropertyType::Relation),
                    ("Edited", PropertyType::LastEditedTime),
                ],
            )
            .unwrap();
        transport
    }

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn create_fills_schema_defaults_and_plain_text() {
        let transport = transport();
        let document = transport
            .create_document(
                "db-1",
                props(json!({"Name": {"title": [{"text": {"content": "a"}}]}})),
            )
            .unwrap();

        assert_eq!(document.properties["Name"]["type"], "title");
        assert_eq!(document.properties["Name"]["title"][0]["plain_text"], "a");
        assert_eq!(document.properties["Status"]["select"], Value::Null);
        assert_eq!(document.properties["Owner"]["has_more"], false);
        assert!(document.properties["Edited"]["last_edited_time"].is_string());
    }

    #[test]
    fn tag_mismatch_is_rejected() {
        let transport = transport();
        let error = transport
            .create_document("db-1", props(json!({"Status": {"multi_select": []}})))
            .unwrap_err();
        assert!(matches!(error, TransportError::Validation(_)));
    }

    #[test]
    fn read_only_fields_are_rejected() {
        let transport = transport();
        let error = transport
            .create_document(
                "db-1",
                props(json!({"Edited": {"last_edited_time": "2024-01-01T00:00:00.000Z"}})),
            )
            .unwrap_err();
        assert!(matches!(error, TransportError::Validation(_)));
    }

    #[test]
    fn unknown_document_is_not_found() {
        let transport = transport();
        let error = transport
            .update_document("missing", &DocumentPatch::archive())
            .unwrap_err();
        assert_eq!(error, TransportError::NotFound("missing".to_string()));
    }

    #[test]
    fn listing_pages_and_skips_archived() {
        let transport = transport();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(transport.create_document("db-1", Map::new()).unwrap().id);
        }
        transport
            .update_document(&ids[0], &DocumentPatch::archive())
            .unwrap();

        let first = transport.query_page("db-1", None).unwrap();
        assert_eq!(first.results.len(), 2);
        assert!(!first.has_more);
        assert_eq!(first.next_cursor, None);
    }

    #[test]
    fn cursor_past_end_returns_empty_last_page() {
        let transport = transport();
        transport.create_document("db-1", Map::new()).unwrap();

        let cursor = usize::MAX.to_string();
        let page = transport.query_page("db-1", Some(&cursor)).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn injected_failure_applies_once() {
        let transport = transport();
        transport.fail_next(TransportError::Backend("offline".to_string()));
        assert!(transport.query_page("db-1", None).is_err());
        assert!(transport.query_page("db-1", None).is_ok());
    }
}
