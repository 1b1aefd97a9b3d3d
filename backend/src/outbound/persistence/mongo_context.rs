//! MongoDB-backed database context.
//!
//! Wraps a driver [`Client`] and hands out typed collection adapters. The
//! driver manages its own connection pool; cloning the context shares it.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use tracing::debug;

use super::document_codec::{
    decode, encode, filter_document, key_to_string, update_document,
};
use super::mongo_error_mapping::map_mongo_error;
use crate::domain::ports::{
    DatabaseContext, DeleteOutcome, DocumentCollection, DocumentStoreError, Entity, Filter,
    FindOneAndUpdateOptions, ReplaceOutcome, Update,
};

/// Errors raised while building a [`MongoDbContext`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MongoContextError {
    /// The configuration was rejected before contacting the server.
    #[error("invalid MongoDB configuration: {message}")]
    Config { message: String },

    /// The server could not be reached.
    #[error("failed to reach MongoDB: {message}")]
    Connect { message: String },
}

impl MongoContextError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }
}

/// Connection settings for [`MongoDbContext`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_api::outbound::persistence::MongoConfig;
///
/// let config = MongoConfig::new("mongodb://localhost:27017", "users_db")
///     .with_app_name("user-api")
///     .with_server_selection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database(), "users_db");
/// ```
#[derive(Debug, Clone)]
pub struct MongoConfig {
    uri: String,
    database: String,
    app_name: Option<String>,
    server_selection_timeout: Duration,
}

impl MongoConfig {
    /// Defaults to a 10 second server selection timeout.
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            app_name: None,
            server_selection_timeout: Duration::from_secs(10),
        }
    }

    /// Application name reported to the server.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Database context backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoDbContext {
    database: Database,
}

impl MongoDbContext {
    /// Parse `config` and build a client for its database.
    ///
    /// No round trip is made; call [`MongoDbContext::ping`] to check the
    /// server is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`MongoContextError::Config`] for an empty database name or a
    /// URI the driver rejects.
    pub async fn connect(config: MongoConfig) -> Result<Self, MongoContextError> {
        if config.database.trim().is_empty() {
            return Err(MongoContextError::config("database name must not be empty"));
        }
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|err| MongoContextError::config(err.to_string()))?;
        if config.app_name.is_some() {
            options.app_name = config.app_name;
        }
        options.server_selection_timeout = Some(config.server_selection_timeout);
        let client =
            Client::with_options(options).map_err(|err| MongoContextError::config(err.to_string()))?;
        Ok(Self::from_database(client.database(&config.database)))
    }

    /// Wrap an existing driver handle.
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    /// Round-trip a `ping` command.
    ///
    /// # Errors
    ///
    /// Returns [`MongoContextError::Connect`] when the server does not answer.
    pub async fn ping(&self) -> Result<(), MongoContextError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|err| MongoContextError::connect(err.to_string()))
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Drop the whole database. Used to clean up disposable test databases.
    ///
    /// # Errors
    ///
    /// Returns the mapped driver error when the server refuses the drop.
    pub async fn drop_database(&self) -> Result<(), DocumentStoreError> {
        self.database.drop().await.map_err(map_mongo_error)
    }
}

impl DatabaseContext for MongoDbContext {
    fn collection<T: Entity>(&self, name: &str) -> Arc<dyn DocumentCollection<T>> {
        Arc::new(MongoCollection::<T> {
            inner: self.database.collection::<Document>(name),
            _entity: PhantomData,
        })
    }
}

struct MongoCollection<T> {
    inner: Collection<Document>,
    _entity: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: Entity> DocumentCollection<T> for MongoCollection<T> {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DocumentStoreError> {
        let documents: Vec<Document> = self
            .inner
            .find(filter_document::<T>(filter))
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;
        documents.into_iter().map(decode).collect()
    }

    async fn insert_one(&self, document: &T) -> Result<String, DocumentStoreError> {
        let result = self
            .inner
            .insert_one(encode(document)?)
            .await
            .map_err(map_mongo_error)?;
        let id = key_to_string(&result.inserted_id);
        debug!(collection = self.inner.name(), id = %id, "document inserted");
        Ok(id)
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: &T,
    ) -> Result<ReplaceOutcome, DocumentStoreError> {
        let result = self
            .inner
            .replace_one(filter_document::<T>(filter), encode(replacement)?)
            .await
            .map_err(map_mongo_error)?;
        Ok(ReplaceOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome, DocumentStoreError> {
        let result = self
            .inner
            .delete_one(filter_document::<T>(filter))
            .await
            .map_err(map_mongo_error)?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        options: FindOneAndUpdateOptions,
    ) -> Result<Option<T>, DocumentStoreError> {
        let return_document = if options.return_after {
            ReturnDocument::After
        } else {
            ReturnDocument::Before
        };
        self.inner
            .find_one_and_update(filter_document::<T>(filter), update_document(update))
            .return_document(return_document)
            .upsert(options.upsert)
            .await
            .map_err(map_mongo_error)?
            .map(decode)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_defaults() {
        let config = MongoConfig::new("mongodb://localhost:27017", "users_db");

        assert_eq!(config.uri(), "mongodb://localhost:27017");
        assert_eq!(config.database(), "users_db");
        assert!(config.app_name.is_none());
        assert_eq!(config.server_selection_timeout, Duration::from_secs(10));
    }

    #[rstest]
    #[tokio::test]
    async fn connect_rejects_empty_database_name() {
        let result = MongoDbContext::connect(MongoConfig::new("mongodb://localhost:27017", " ")).await;
        assert!(matches!(result, Err(MongoContextError::Config { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn connect_rejects_malformed_uri() {
        let result = MongoDbContext::connect(MongoConfig::new("postgres://nope", "users_db")).await;
        assert!(matches!(result, Err(MongoContextError::Config { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn connect_does_not_contact_the_server() {
        let context = MongoDbContext::connect(
            MongoConfig::new("mongodb://127.0.0.1:1", "users_db").with_app_name("user-api"),
        )
        .await
        .expect("client builds lazily");
        assert_eq!(context.database_name(), "users_db");
    }
}
