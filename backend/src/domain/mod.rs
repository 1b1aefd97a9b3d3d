//! Domain primitives, aggregates and services.
//!
//! Purpose: define the user and counter entities, their validation rules and
//! the service implementing the driving ports. Nothing here knows about HTTP
//! or a particular database driver.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User (alias to `user::User`) — user document with optional fields.
//! - Counter (alias to `counter::Counter`) — named sequence value.
//! - UserService (alias to `user_service::UserService`) — port implementation.

pub mod counter;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod validation;

pub use self::counter::{Counter, USER_ID_SEQUENCE};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Address, Company, Geo, User, UserId, UserIdValidationError};
pub use self::user_service::{CollectionNames, CollectionNamesError, UserService};
pub use self::validation::{ValidationErrors, validate_user};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use user_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
