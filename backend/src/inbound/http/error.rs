//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::ports::DocumentStoreError;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Replace internal errors with a generic payload, keeping only the failure
/// kind and the trace id.
fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(INTERNAL_MESSAGE);
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        if let Some(kind) = error.details().and_then(|details| details.get("kind")) {
            redacted = redacted.with_details(json!({ "kind": kind }));
        }
        redacted
    } else {
        error.clone()
    }
}

/// Translate a store failure into an API error.
///
/// Duplicate keys become conflicts; everything else is an internal error
/// tagged with its kind. Driver messages name databases and collections, so
/// they are logged and never returned.
pub(crate) fn map_store_error(err: DocumentStoreError) -> Error {
    match err {
        DocumentStoreError::DuplicateKey { key } => {
            warn!(key = %key, "duplicate key rejected");
            Error::conflict("user already exists").with_details(json!({ "code": "duplicate_key" }))
        }
        other => {
            error!(kind = other.kind(), error = %other, "document store failure");
            Error::internal(other.to_string()).with_details(json!({ "kind": other.kind() }))
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}
