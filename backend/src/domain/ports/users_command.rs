//! Driving port for mutating users.

use async_trait::async_trait;
use thiserror::Error;

use super::DocumentStoreError;
use crate::domain::{User, ValidationErrors};

/// Failure of a validated write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserServiceError {
    /// The user broke one or more field constraints. The store was not
    /// touched.
    #[error("user failed validation: {0}")]
    Validation(ValidationErrors),
    /// The store rejected or failed the write.
    #[error(transparent)]
    Store(#[from] DocumentStoreError),
}

impl From<ValidationErrors> for UserServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

/// Domain use-case port for user writes.
///
/// Create and update validate the whole user before any store call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and insert `user`, returning it with its assigned id.
    ///
    /// # Errors
    ///
    /// [`UserServiceError::Store`] wraps a
    /// [`DocumentStoreError::DuplicateKey`] when the id is already taken.
    async fn create_user(&self, user: User) -> Result<User, UserServiceError>;

    /// Validate and replace the user stored under `id`.
    ///
    /// Returns `true` only when the stored document changed. Unknown ids and
    /// identical replacements both yield `false`.
    async fn update_user(&self, id: &str, user: User) -> Result<bool, UserServiceError>;

    /// Delete the user stored under `id`, returning whether one was removed.
    async fn delete_user(&self, id: &str) -> Result<bool, DocumentStoreError>;
}
