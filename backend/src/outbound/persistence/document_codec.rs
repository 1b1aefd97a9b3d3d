//! Translation between domain entities and stored BSON documents.
//!
//! Entities expose their key as `id`; stored documents use `_id`. Object-id
//! keys are stored as native `ObjectId` values and rendered back as lowercase
//! hex.

use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};

use crate::domain::ports::{DocumentStoreError, Entity, Filter, KeyKind, Update};

pub(crate) const STORED_KEY: &str = "_id";
const ENTITY_KEY: &str = "id";

/// Convert a raw identifier into the stored key value.
///
/// Strings that do not parse as an object id are kept verbatim so they match
/// nothing rather than failing the query.
pub(crate) fn key_to_bson(kind: KeyKind, raw: &str) -> Bson {
    match kind {
        KeyKind::ObjectId => ObjectId::parse_str(raw)
            .map(Bson::ObjectId)
            .unwrap_or_else(|_| Bson::String(raw.to_owned())),
        KeyKind::Name => Bson::String(raw.to_owned()),
    }
}

/// Render a stored key as the string form used by entities.
pub(crate) fn key_to_string(key: &Bson) -> String {
    match key {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(value) => value.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn encode<T: Entity>(entity: &T) -> Result<Document, DocumentStoreError> {
    let mut body = bson::to_document(entity)
        .map_err(|err| DocumentStoreError::serialization(err.to_string()))?;
    let mut document = Document::new();
    match body.remove(ENTITY_KEY) {
        Some(Bson::String(raw)) => {
            document.insert(STORED_KEY, key_to_bson(T::KEY_KIND, &raw));
        }
        Some(Bson::Null) | None => {}
        Some(other) => {
            return Err(DocumentStoreError::serialization(format!(
                "entity id must be a string, got {other}"
            )));
        }
    }
    for (field, value) in body {
        document.insert(field, value);
    }
    Ok(document)
}

pub(crate) fn decode<T: Entity>(mut document: Document) -> Result<T, DocumentStoreError> {
    if let Some(key) = document.remove(STORED_KEY) {
        document.insert(ENTITY_KEY, key_to_string(&key));
    }
    bson::from_document(document).map_err(|err| DocumentStoreError::serialization(err.to_string()))
}

pub(crate) fn filter_document<T: Entity>(filter: &Filter) -> Document {
    match filter {
        Filter::All => Document::new(),
        Filter::IdEquals(raw) => {
            let mut document = Document::new();
            document.insert(STORED_KEY, key_to_bson(T::KEY_KIND, raw));
            document
        }
    }
}

pub(crate) fn update_document(update: &Update) -> Document {
    match update {
        Update::Increment { field, by } => {
            let mut increments = Document::new();
            increments.insert(*field, *by);
            doc! { "$inc": increments }
        }
    }
}
