//! Shared mapping from MongoDB driver failures to document store errors.

use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};

use crate::domain::ports::DocumentStoreError;

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

pub(super) fn map_mongo_error(error: MongoError) -> DocumentStoreError {
    let message = error.to_string();
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            DocumentStoreError::duplicate_key(write.message.clone())
        }
        ErrorKind::Command(command) if command.code == DUPLICATE_KEY_CODE => {
            DocumentStoreError::duplicate_key(command.message.clone())
        }
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. } => DocumentStoreError::connection(message),
        ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
            DocumentStoreError::serialization(message)
        }
        _ => DocumentStoreError::query(message),
    }
}
