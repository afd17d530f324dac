//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notiondb_core` linkage without remote credentials.
//! - Run one insert/mutate/read/archive cycle against the in-process transport.
//!
//! An optional first argument names a JSON `SyncConfig` file. Logs go to
//! the config's `log_dir`, or a temp directory when it is unset.

use notiondb_core::{
    CollectionSync, DocumentCache, MemoryTransport, PropertyDescriptor, PropertyType,
    PropertyValue, RecordStore, SyncConfig,
};
use std::error::Error;
use std::process::ExitCode;

const DEMO_COLLECTION: &str = "demo-accounts";

fn main() -> ExitCode {
    println!("notiondb_core ping={}", notiondb_core::ping());
    println!("notiondb_core version={}", notiondb_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notiondb_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::new(DEMO_COLLECTION),
    };
    let log_dir = config.resolved_log_dir();
    notiondb_core::init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    println!(
        "notiondb_core logging level={} dir={}",
        config.log_level,
        log_dir.display()
    );

    let transport = MemoryTransport::with_page_size(config.page_size);
    transport.register_collection(
        &config.collection_id,
        [
            ("Name".to_string(), PropertyType::Title),
            (config.key_field.clone(), PropertyType::Number),
            ("Status".to_string(), PropertyType::Select),
            ("Last edited time".to_string(), PropertyType::LastEditedTime),
        ],
    )?;
    let store = RecordStore::new(transport);
    let sync = CollectionSync::new(&store, config.clone());
    let mut cache = DocumentCache::new();

    for id in 1..=3_i64 {
        sync.upsert(
            &mut cache,
            &id.to_string(),
            &[
                PropertyDescriptor::title("Name", format!("account {id}")),
                PropertyDescriptor::new(config.key_field.as_str(), PropertyType::Number, id),
                PropertyDescriptor::new("Status", PropertyType::Select, "Active"),
            ],
        )?;
    }

    let written = cache.set_property(
        store.transport(),
        "2",
        "Status",
        PropertyValue::from("Suspended"),
    )?;
    let loaded = sync.load(&mut cache)?;
    sync.archive(&mut cache, "3")?;

    println!(
        "notiondb_core demo inserted=3 mutated={} loaded={} remaining={} updates={}",
        written.unwrap_or(false),
        loaded,
        cache.len(),
        store.transport().update_calls()
    );
    Ok(())
}
