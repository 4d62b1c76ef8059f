//! Conversions between model types and BSON documents.
//!
//! Identifiers are ObjectIds in the database and hex strings everywhere else;
//! the switch happens here.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use solo_models::{BidCount, DocId};

use crate::error::{StoreError, StoreResult};

/// Parse a hex identifier, failing fast on malformed input.
pub fn parse_object_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::invalid_id(id))
}

/// Generate a fresh identifier.
pub fn new_doc_id() -> DocId {
    DocId::from(ObjectId::new().to_hex())
}

/// Serialize a model into a document suitable for insert or `$set`.
///
/// Any `_id` is dropped; identifiers are never written from client data.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    let mut doc = bson::to_document(value)?;
    doc.remove("_id");
    Ok(doc)
}

/// Deserialize a stored document, rendering an ObjectId `_id` as hex and
/// top-level dates as RFC 3339 strings.
pub fn from_document<T: DeserializeOwned>(mut doc: Document) -> StoreResult<T> {
    let hex = match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => Some(oid.to_hex()),
        _ => None,
    };
    if let Some(hex) = hex {
        doc.insert("_id", hex);
    }

    for (_, value) in doc.iter_mut() {
        if let Bson::DateTime(dt) = value {
            if let Ok(iso) = dt.try_to_rfc3339_string() {
                *value = Bson::String(iso);
            }
        }
    }

    Ok(bson::from_document(doc)?)
}

/// Identifier carried by a driver result value.
pub fn doc_id_from_bson(value: &Bson) -> Option<DocId> {
    match value {
        Bson::ObjectId(oid) => Some(DocId::from(oid.to_hex())),
        Bson::String(s) => Some(DocId::from(s.as_str())),
        _ => None,
    }
}

/// Read a stored bid counter.
pub fn bid_count_from_bson(value: &Bson) -> BidCount {
    match value {
        Bson::Int32(n) => BidCount::Count(i64::from(*n)),
        Bson::Int64(n) => BidCount::Count(*n),
        Bson::Double(f) => BidCount::Other(
            serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        ),
        Bson::String(s) => BidCount::Other(Value::String(s.clone())),
        _ => BidCount::Other(Value::Null),
    }
}
