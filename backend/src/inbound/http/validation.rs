//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use super::error::map_store_error;
use crate::domain::ports::UserServiceError;
use crate::domain::{Error, UserId, ValidationErrors};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidObjectId,
    ValidationFailed,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidObjectId => "invalid_object_id",
            ErrorCode::ValidationFailed => "validation_failed",
        }
    }
}

/// Parse a path identifier, rejecting anything that is not an object id.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "id",
            "value": raw,
            "code": ErrorCode::InvalidObjectId.as_str(),
        }))
    })
}

/// Aggregate field report as a 400 payload.
pub(crate) fn validation_error(report: &ValidationErrors) -> Error {
    Error::invalid_request("user failed validation").with_details(json!({
        "code": ErrorCode::ValidationFailed.as_str(),
        "fieldErrors": report,
    }))
}

pub(crate) fn map_service_error(err: UserServiceError) -> Error {
    match err {
        UserServiceError::Validation(report) => validation_error(&report),
        UserServiceError::Store(store) => map_store_error(store),
    }
}
