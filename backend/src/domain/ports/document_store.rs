//! Driven port for document collections.
//!
//! The domain describes reads and writes in terms of [`Filter`] and
//! [`Update`]; adapters translate them into their native query language.
//! Entities carry an `id` field which adapters store under their own primary
//! key and translate back on the way out.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use super::define_port_error;

/// How an entity's `id` is represented in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Store-generated 12-byte object id, exposed as 24 hex characters.
    ObjectId,
    /// Caller-chosen string key, e.g. a sequence name.
    Name,
}

/// Document persisted in a [`DocumentCollection`].
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Primary key representation.
    const KEY_KIND: KeyKind;
}

/// Document selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// The document whose `id` equals the given raw value.
    ///
    /// A value that is not a well-formed key for the entity matches nothing.
    IdEquals(String),
}

impl Filter {
    /// Select by identifier.
    pub fn id(id: impl Into<String>) -> Self {
        Self::IdEquals(id.into())
    }
}

/// Partial update applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// Add `by` to numeric `field`, treating a missing field as zero.
    Increment { field: &'static str, by: i64 },
}

/// Options for [`DocumentCollection::find_one_and_update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOneAndUpdateOptions {
    /// Return the document as it is after the update.
    pub return_after: bool,
    /// Create the document when the filter matches nothing.
    pub upsert: bool,
}

/// Result of [`DocumentCollection::replace_one`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub matched_count: u64,
    /// Zero when the replacement was identical to the stored document.
    pub modified_count: u64,
}

/// Result of [`DocumentCollection::delete_one`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// A unique index rejected the write.
        DuplicateKey { key: String } => "duplicate key: {key}",
        /// The store rejected or failed the operation.
        Query { message: String } => "document store query failed: {message}",
        /// A document could not be converted to or from its stored form.
        Serialization { message: String } => "document serialization failed: {message}",
    }
}

/// Typed access to one named collection.
#[async_trait]
pub trait DocumentCollection<T: Entity>: Send + Sync {
    /// Every document matching `filter`, in store order.
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DocumentStoreError>;

    /// Insert `document` and return its identifier.
    ///
    /// The store assigns an identifier when `document` has none.
    async fn insert_one(&self, document: &T) -> Result<String, DocumentStoreError>;

    /// Replace the first document matching `filter`, keeping its identifier.
    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: &T,
    ) -> Result<ReplaceOutcome, DocumentStoreError>;

    /// Delete the first document matching `filter`.
    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome, DocumentStoreError>;

    /// Atomically apply `update` to the first match.
    ///
    /// Returns `None` when nothing matched and `upsert` is off.
    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        options: FindOneAndUpdateOptions,
    ) -> Result<Option<T>, DocumentStoreError>;
}

/// Handle to a database exposing named collections.
///
/// Cloning a context shares the underlying connection.
pub trait DatabaseContext: Send + Sync + 'static {
    /// Typed handle to the collection called `name`.
    fn collection<T: Entity>(&self, name: &str) -> Arc<dyn DocumentCollection<T>>;
}
