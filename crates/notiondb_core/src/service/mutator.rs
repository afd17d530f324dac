//! Single-field read-modify-write on a cached document.
//!
//! # Responsibility
//! - Skip remote writes when the field already holds the target value.
//! - Keep the cached snapshot equal to the latest remote response.
//!
//! # Invariants
//! - At most one remote update per call.
//! - On success the whole snapshot is replaced, not only the touched field.
//! - Not atomic against concurrent remote edits; callers serialize per id.

use crate::codec::decode::declared_type;
use crate::codec::{decode, encode};
use crate::model::document::Document;
use crate::model::property::{PropertyDescriptor, PropertyValue};
use crate::repo::record_store::StoreResult;
use crate::transport::{DocumentPatch, DocumentTransport};
use log::{debug, info};

/// Sets field `name` of `document` to `value`.
///
/// Returns `true` when a remote update was issued, `false` when the decoded
/// current value already equals `value`.
///
/// # Errors
/// - Codec errors when the current value cannot be decoded.
/// - Transport errors from the update call; the snapshot is left unchanged.
pub fn set_property<T: DocumentTransport>(
    transport: &T,
    document: &mut Document,
    name: &str,
    value: PropertyValue,
) -> StoreResult<bool> {
    let current = decode(document, name)?;
    if current == value {
        debug!(
            "event=property_set module=service status=skipped document={} field={}",
            document.id, name
        );
        return Ok(false);
    }

    let kind = declared_type(document, name)?;
    let fragment = encode(&PropertyDescriptor {
        name: name.to_string(),
        kind,
        value,
    });
    let fresh = transport.update_document(&document.id, &DocumentPatch::properties(fragment))?;
    document.replace_with(fresh);
    info!(
        "event=property_set module=service status=ok document={} field={}",
        document.id, name
    );
    Ok(true)
}
