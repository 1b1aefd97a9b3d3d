//! Driving port for reading users.
//!
//! Inbound adapters use this port to fetch users without importing outbound
//! persistence concerns.

use async_trait::async_trait;

use super::DocumentStoreError;
use crate::domain::User;

/// Domain use-case port for user reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every stored user, in store order.
    async fn list_users(&self) -> Result<Vec<User>, DocumentStoreError>;

    /// The user with identifier `id`.
    ///
    /// Returns `Ok(None)` for unknown and malformed identifiers alike.
    async fn get_user(&self, id: &str) -> Result<Option<User>, DocumentStoreError>;
}
