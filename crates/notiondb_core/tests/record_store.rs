use notiondb_core::{
    decode, MemoryTransport, PropertyDescriptor, PropertyType, PropertyValue,
    RecordStore, StoreError, TransportError,
};

const DB: &str = "db-accounts";

fn store(page_size: usize) -> RecordStore<MemoryTransport> {
    let transport = MemoryTransport::with_page_size(page_size);
    transport
        .register_collection(
            DB,
            [
                ("Name", PropertyType::Title),
                ("ID", PropertyType::Number),
                ("Status", PropertyType::Select),
                ("Exists", PropertyType::Checkbox),
                ("Assign", PropertyType::MultiSelect),
                ("Last edited time", PropertyType::LastEditedTime),
            ],
        )
        .unwrap();
    RecordStore::new(transport)
}

fn account(id: i64, status: &str) -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::title("Name", id.to_string()),
        PropertyDescriptor::new("ID", PropertyType::Number, id),
        PropertyDescriptor::new("Status", PropertyType::Select, status),
        PropertyDescriptor::new("Exists", PropertyType::Checkbox, true),
        PropertyDescriptor::new("Assign", PropertyType::MultiSelect, vec!["ops"]),
    ]
}

#[test]
fn insert_returns_created_document() {
    let store = store(100);
    let document = store.insert(DB, &account(7, "Active")).unwrap();

    assert!(!document.id.is_empty());
    assert!(!document.archived);
    assert_eq!(decode(&document, "ID").unwrap(), PropertyValue::Number(7.0));
    assert_eq!(decode(&document, "Status").unwrap(), PropertyValue::from("Active"));
    assert!(matches!(
        decode(&document, "Last edited time").unwrap(),
        PropertyValue::DateTime(_)
    ));
}

#[test]
fn update_writes_even_when_value_is_unchanged() {
    let store = store(100);
    let document = store.insert(DB, &account(7, "Active")).unwrap();

    store.update(&document.id, &account(7, "Active")).unwrap();
    store.update(&document.id, &account(7, "Active")).unwrap();

    assert_eq!(store.transport().update_calls(), 2);
}

#[test]
fn update_returns_fresh_document() {
    let store = store(100);
    let document = store.insert(DB, &account(7, "Active")).unwrap();

    let updated = store
        .update(
            &document.id,
            &[PropertyDescriptor::new("Status", PropertyType::Select, "Banned")],
        )
        .unwrap();

    assert_eq!(updated.id, document.id);
    assert_eq!(decode(&updated, "Status").unwrap(), PropertyValue::from("Banned"));
    assert_eq!(decode(&updated, "Name").unwrap(), PropertyValue::from("7"));
}

#[test]
fn delete_archives_without_removing() {
    let store = store(100);
    let document = store.insert(DB, &account(7, "Active")).unwrap();

    let archived = store.delete(&document.id).unwrap();
    assert!(archived.archived);

    let stored = store.transport().document(&document.id).unwrap();
    assert!(stored.archived);

    let listed: usize = store.read(DB).map(|batch| batch.unwrap().len()).sum();
    assert_eq!(listed, 0);
}

#[test]
fn read_yields_one_batch_per_page() {
    let store = store(2);
    for id in 0..5 {
        store.insert(DB, &account(id, "Active")).unwrap();
    }

    let sizes: Vec<usize> = store
        .read(DB)
        .map(|batch| batch.unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn read_is_lazy_and_restartable() {
    let store = store(2);
    for id in 0..4 {
        store.insert(DB, &account(id, "Active")).unwrap();
    }

    let mut batches = store.read(DB);
    assert_eq!(store.transport().query_calls(), 0);
    batches.next().unwrap().unwrap();
    assert_eq!(store.transport().query_calls(), 1);

    let total: usize = store.read(DB).map(|batch| batch.unwrap().len()).sum();
    assert_eq!(total, 4);
}

#[test]
fn read_of_empty_collection_yields_one_empty_batch() {
    let store = store(2);
    let batches: Vec<_> = store.read(DB).map(Result::unwrap).collect();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].is_empty());
}

#[test]
fn read_stops_after_transport_error() {
    let store = store(2);
    store
        .transport()
        .fail_next(TransportError::Backend("unauthorized".to_string()));

    let results: Vec<_> = store.read(DB).collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(StoreError::Transport(_))));
}

#[test]
fn schema_mismatch_is_rejected_remotely() {
    let store = store(100);
    let error = store
        .insert(
            DB,
            &[PropertyDescriptor::new("Status", PropertyType::MultiSelect, vec!["x"])],
        )
        .unwrap_err();

    assert!(matches!(
        error,
        StoreError::Transport(TransportError::Validation(_))
    ));
}

#[test]
fn unknown_collection_and_document_propagate_not_found() {
    let store = store(100);
    assert!(matches!(
        store.insert("missing", &account(1, "Active")),
        Err(StoreError::Transport(TransportError::NotFound(_)))
    ));
    assert!(matches!(
        store.delete("missing"),
        Err(StoreError::Transport(TransportError::NotFound(_)))
    ));
    assert_eq!(store.transport().create_calls(), 1);
}
