//! User and sequence domain service.
//!
//! Implements the [`UsersQuery`], [`UsersCommand`] and [`SequenceCounter`]
//! driving ports on top of any [`DatabaseContext`]. Expected outcomes such as
//! unknown identifiers come back as `None` or `false`; store failures
//! propagate unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{
    DatabaseContext, DocumentCollection, DocumentStoreError, Filter, FindOneAndUpdateOptions,
    SequenceCounter, Update, UserServiceError, UsersCommand, UsersQuery,
};
use crate::domain::{Counter, User, UserId, validate_user};

/// Default name of the users collection.
pub const DEFAULT_USERS_COLLECTION: &str = "users";
/// Default name of the counters collection.
pub const DEFAULT_COUNTERS_COLLECTION: &str = "counters";

/// Errors returned by [`CollectionNames::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionNamesError {
    #[error("users collection name must not be empty")]
    EmptyUsers,
    #[error("counters collection name must not be empty")]
    EmptyCounters,
}

/// Names of the collections backing the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    users: String,
    counters: String,
}

impl CollectionNames {
    /// Validate and construct collection names.
    ///
    /// # Examples
    /// ```
    /// use user_api::domain::CollectionNames;
    ///
    /// let names = CollectionNames::new("people", "sequences").expect("valid names");
    /// assert_eq!(names.users(), "people");
    /// assert!(CollectionNames::new("", "sequences").is_err());
    /// ```
    pub fn new(
        users: impl Into<String>,
        counters: impl Into<String>,
    ) -> Result<Self, CollectionNamesError> {
        let users = users.into();
        let counters = counters.into();
        if users.trim().is_empty() {
            return Err(CollectionNamesError::EmptyUsers);
        }
        if counters.trim().is_empty() {
            return Err(CollectionNamesError::EmptyCounters);
        }
        Ok(Self { users, counters })
    }

    pub fn users(&self) -> &str {
        &self.users
    }

    pub fn counters(&self) -> &str {
        &self.counters
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS_COLLECTION.to_owned(),
            counters: DEFAULT_COUNTERS_COLLECTION.to_owned(),
        }
    }
}

/// User service implementing the driving ports.
pub struct UserService<C> {
    context: Arc<C>,
    names: CollectionNames,
}

impl<C> Clone for UserService<C> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            names: self.names.clone(),
        }
    }
}

impl<C> UserService<C> {
    /// Create a service over `context` using the given collection names.
    pub fn new(context: Arc<C>, names: CollectionNames) -> Self {
        Self { context, names }
    }

    pub fn collection_names(&self) -> &CollectionNames {
        &self.names
    }
}

impl<C: DatabaseContext> UserService<C> {
    fn users(&self) -> Arc<dyn DocumentCollection<User>> {
        self.context.collection(self.names.users())
    }

    fn counters(&self) -> Arc<dyn DocumentCollection<Counter>> {
        self.context.collection(self.names.counters())
    }
}

#[async_trait]
impl<C: DatabaseContext> UsersQuery for UserService<C> {
    async fn list_users(&self) -> Result<Vec<User>, DocumentStoreError> {
        self.users().find(&Filter::All).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, DocumentStoreError> {
        let mut found = self.users().find(&Filter::id(id)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }
}

#[async_trait]
impl<C: DatabaseContext> UsersCommand for UserService<C> {
    async fn create_user(&self, user: User) -> Result<User, UserServiceError> {
        validate_user(&user)?;
        let inserted = self.users().insert_one(&user).await?;
        let id = UserId::new(&inserted).map_err(|err| {
            DocumentStoreError::serialization(format!("store returned id {inserted:?}: {err}"))
        })?;
        debug!(user_id = %id, "user created");
        Ok(user.with_id(id))
    }

    async fn update_user(&self, id: &str, mut user: User) -> Result<bool, UserServiceError> {
        validate_user(&user)?;
        // A malformed id matches nothing, so the payload keeps no id either.
        user.id = UserId::new(id).ok();
        let outcome = self.users().replace_one(&Filter::id(id), &user).await?;
        debug!(
            user_id = id,
            matched = outcome.matched_count,
            modified = outcome.modified_count,
            "user replaced"
        );
        Ok(outcome.modified_count > 0)
    }

    async fn delete_user(&self, id: &str) -> Result<bool, DocumentStoreError> {
        let outcome = self.users().delete_one(&Filter::id(id)).await?;
        Ok(outcome.deleted_count > 0)
    }
}

#[async_trait]
impl<C: DatabaseContext> SequenceCounter for UserService<C> {
    async fn increment_sequence(&self, name: &str) -> Result<Counter, DocumentStoreError> {
        let options = FindOneAndUpdateOptions {
            return_after: true,
            upsert: true,
        };
        let update = Update::Increment {
            field: "seq",
            by: 1,
        };
        self.counters()
            .find_one_and_update(&Filter::id(name), &update, options)
            .await?
            .ok_or_else(|| {
                DocumentStoreError::query(format!("upsert of sequence {name:?} returned nothing"))
            })
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
