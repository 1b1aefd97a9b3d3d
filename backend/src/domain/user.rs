//! User data model.
//!
//! Field values are kept as raw optional strings so that a payload can be
//! deserialised even when it is invalid; [`crate::domain::validation`]
//! reports every broken constraint at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::ports::{Entity, KeyKind};

/// Number of hexadecimal characters in a rendered object identifier.
pub const USER_ID_LEN: usize = 24;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserIdValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    Empty,
    /// The identifier was not 24 hexadecimal characters.
    #[error("user id must be a {USER_ID_LEN}-character hexadecimal object id")]
    InvalidFormat,
}

/// Store-assigned user identifier: a 12-byte object id rendered as lowercase
/// hex.
///
/// Parsing accepts either case and normalises to lowercase.
///
/// # Examples
/// ```
/// use user_api::domain::UserId;
///
/// let id = UserId::new("65F1C0FFEE0000000000BEEF").expect("valid id");
/// assert_eq!(id.as_ref(), "65f1c0ffee0000000000beef");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserIdValidationError::Empty);
        }
        if raw.len() != USER_ID_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(UserIdValidationError::InvalidFormat);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Geographic coordinates stored as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Geo {
    /// Latitude, e.g. `-37.3159`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "-37.3159")]
    pub lat: Option<String>,
    /// Longitude, e.g. `81.1496`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "81.1496")]
    pub lng: Option<String>,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

/// Employer details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Romaguera-Crona")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

/// Application user.
///
/// ## Invariants
/// - `id` is `None` until the store assigns one on insert.
/// - Once persisted, `id` only changes through a full replacement keyed by
///   the same identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "65f1c0ffee0000000000beef")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "John Doe")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "johndoe")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "johndoe@example.com")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "https://example.com")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

impl User {
    /// Build a user from the three required fields.
    ///
    /// # Examples
    /// ```
    /// use user_api::domain::User;
    ///
    /// let user = User::new("John Doe", "johndoe", "johndoe@example.com");
    /// assert!(user.id.is_none());
    /// ```
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            username: Some(username.into()),
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Return the user with `id` assigned.
    #[must_use]
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    /// Coordinates, when both the address and its geo block are present.
    pub fn geo(&self) -> Option<&Geo> {
        self.address.as_ref().and_then(|address| address.geo.as_ref())
    }
}

impl Entity for User {
    const KEY_KIND: KeyKind = KeyKind::ObjectId;
}
