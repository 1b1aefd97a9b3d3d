//! In-process database context.
//!
//! Stores encoded documents per collection behind a single mutex so every
//! operation, including find-and-update, is atomic. Documents go through the
//! same codec as the MongoDB adapter, so key handling matches.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};

use super::document_codec::{STORED_KEY, decode, encode, filter_document, key_to_string};
use crate::domain::ports::{
    DatabaseContext, DeleteOutcome, DocumentCollection, DocumentStoreError, Entity, Filter,
    FindOneAndUpdateOptions, ReplaceOutcome, Update,
};

type Collections = HashMap<String, Vec<Document>>;

/// Database context holding every collection in memory.
///
/// # Example
///
/// ```
/// use user_api::domain::{CollectionNames, UserService};
/// use user_api::outbound::persistence::InMemoryDatabaseContext;
/// use std::sync::Arc;
///
/// let service = UserService::new(
///     Arc::new(InMemoryDatabaseContext::new()),
///     CollectionNames::default(),
/// );
/// assert_eq!(service.collection_names().users(), "users");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabaseContext {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryDatabaseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored in `name`.
    pub fn document_count(&self, name: &str) -> usize {
        self.lock()
            .map(|collections| collections.get(name).map_or(0, Vec::len))
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, DocumentStoreError> {
        self.collections
            .lock()
            .map_err(|_| DocumentStoreError::connection("in-memory store lock poisoned"))
    }
}

impl DatabaseContext for InMemoryDatabaseContext {
    fn collection<T: Entity>(&self, name: &str) -> Arc<dyn DocumentCollection<T>> {
        Arc::new(InMemoryCollection::<T> {
            context: self.clone(),
            name: name.to_owned(),
            _entity: PhantomData,
        })
    }
}

struct InMemoryCollection<T> {
    context: InMemoryDatabaseContext,
    name: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> InMemoryCollection<T> {
    /// Run `op` against this collection's documents while holding the lock.
    fn with_documents<R>(
        &self,
        op: impl FnOnce(&mut Vec<Document>) -> Result<R, DocumentStoreError>,
    ) -> Result<R, DocumentStoreError> {
        let mut collections = self.context.lock()?;
        let documents = collections.entry(self.name.clone()).or_default();
        op(documents)
    }

    fn position(documents: &[Document], filter: &Filter) -> Option<usize> {
        let selector = filter_document::<T>(filter);
        documents.iter().position(|document| matches(document, &selector))
    }

    fn first_match<'a>(documents: &'a mut [Document], filter: &Filter) -> Option<&'a mut Document> {
        let selector = filter_document::<T>(filter);
        documents
            .iter_mut()
            .find(|document| matches(document, &selector))
    }
}

fn matches(document: &Document, selector: &Document) -> bool {
    selector
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

fn apply_update(document: &mut Document, update: &Update) -> Result<(), DocumentStoreError> {
    match update {
        Update::Increment { field, by } => {
            let current = match document.get(*field) {
                None | Some(Bson::Null) => 0,
                Some(Bson::Int32(value)) => i64::from(*value),
                Some(Bson::Int64(value)) => *value,
                Some(other) => {
                    return Err(DocumentStoreError::query(format!(
                        "cannot increment non-integer field {field}: {other}"
                    )));
                }
            };
            let next = current.checked_add(*by).ok_or_else(|| {
                DocumentStoreError::query(format!("increment of {field} overflowed"))
            })?;
            document.insert(*field, Bson::Int64(next));
            Ok(())
        }
    }
}

/// Document created when an upsert matches nothing: the filter's equality
/// fields, or a fresh object id for an unconstrained filter.
fn upsert_seed<T: Entity>(filter: &Filter) -> Document {
    match filter {
        Filter::All => {
            let mut document = Document::new();
            document.insert(STORED_KEY, ObjectId::new());
            document
        }
        Filter::IdEquals(_) => filter_document::<T>(filter),
    }
}

#[async_trait]
impl<T: Entity> DocumentCollection<T> for InMemoryCollection<T> {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DocumentStoreError> {
        let selector = filter_document::<T>(filter);
        let found: Vec<Document> = self.with_documents(|documents| {
            Ok(documents
                .iter()
                .filter(|document| matches(document, &selector))
                .cloned()
                .collect())
        })?;
        found.into_iter().map(decode).collect()
    }

    async fn insert_one(&self, document: &T) -> Result<String, DocumentStoreError> {
        let mut encoded = encode(document)?;
        if !encoded.contains_key(STORED_KEY) {
            let mut with_key = Document::new();
            with_key.insert(STORED_KEY, ObjectId::new());
            for (field, value) in encoded {
                with_key.insert(field, value);
            }
            encoded = with_key;
        }
        self.with_documents(|documents| {
            let key = encoded.get(STORED_KEY).cloned().unwrap_or(Bson::Null);
            if documents
                .iter()
                .any(|stored| stored.get(STORED_KEY) == Some(&key))
            {
                return Err(DocumentStoreError::duplicate_key(format!(
                    "{STORED_KEY}: {}",
                    key_to_string(&key)
                )));
            }
            documents.push(encoded);
            Ok(key_to_string(&key))
        })
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: &T,
    ) -> Result<ReplaceOutcome, DocumentStoreError> {
        let encoded = encode(replacement)?;
        self.with_documents(|documents| {
            let Some(stored) = Self::first_match(documents, filter) else {
                return Ok(ReplaceOutcome::default());
            };
            let key = stored.get(STORED_KEY).cloned().unwrap_or(Bson::Null);
            if let Some(requested) = encoded.get(STORED_KEY)
                && *requested != key
            {
                return Err(DocumentStoreError::query(format!(
                    "replacement would change immutable {STORED_KEY}"
                )));
            }
            let mut next = Document::new();
            next.insert(STORED_KEY, key);
            for (field, value) in encoded {
                if field != STORED_KEY {
                    next.insert(field, value);
                }
            }
            let modified = *stored != next;
            if modified {
                *stored = next;
            }
            Ok(ReplaceOutcome {
                matched_count: 1,
                modified_count: u64::from(modified),
            })
        })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteOutcome, DocumentStoreError> {
        self.with_documents(|documents| {
            Ok(match Self::position(documents, filter) {
                Some(index) => {
                    documents.remove(index);
                    DeleteOutcome { deleted_count: 1 }
                }
                None => DeleteOutcome::default(),
            })
        })
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        options: FindOneAndUpdateOptions,
    ) -> Result<Option<T>, DocumentStoreError> {
        let snapshot = self.with_documents(|documents| {
            let Some(document) = Self::first_match(documents, filter) else {
                if !options.upsert {
                    return Ok(None);
                }
                let mut created = upsert_seed::<T>(filter);
                apply_update(&mut created, update)?;
                documents.push(created.clone());
                // An upsert has no prior version to return.
                return Ok(options.return_after.then_some(created));
            };
            let before = document.clone();
            apply_update(document, update)?;
            Ok(Some(if options.return_after {
                document.clone()
            } else {
                before
            }))
        })?;
        snapshot.map(decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Counter, User, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn context() -> InMemoryDatabaseContext {
        InMemoryDatabaseContext::new()
    }

    fn john() -> User {
        User::new("John Doe", "johndoe", "johndoe@example.com")
    }

    fn upsert_after() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions {
            return_after: true,
            upsert: true,
        }
    }

    const SEQ: Update = Update::Increment {
        field: "seq",
        by: 1,
    };

    #[rstest]
    #[tokio::test]
    async fn insert_assigns_object_id(context: InMemoryDatabaseContext) {
        let users = context.collection::<User>("users");
        let id = users.insert_one(&john()).await.expect("insert");

        assert!(UserId::new(&id).is_ok());
        let found = users.find(&Filter::id(&id)).await.expect("find");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.as_ref().map(ToString::to_string), Some(id));
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_id(context: InMemoryDatabaseContext) {
        let users = context.collection::<User>("users");
        let id = UserId::new("65f1c0ffee0000000000beef").expect("valid id");
        users
            .insert_one(&john().with_id(id.clone()))
            .await
            .expect("first insert");

        let err = users
            .insert_one(&john().with_id(id))
            .await
            .expect_err("second insert collides");
        assert_eq!(err.kind(), "duplicate_key");
        assert_eq!(context.document_count("users"), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_ids_match_nothing(context: InMemoryDatabaseContext) {
        let users = context.collection::<User>("users");
        users.insert_one(&john()).await.expect("insert");

        let filter = Filter::id("not-an-object-id");
        assert!(users.find(&filter).await.expect("find").is_empty());
        assert_eq!(users.delete_one(&filter).await.expect("delete").deleted_count, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn replace_reports_modification_only_on_change(context: InMemoryDatabaseContext) {
        let users = context.collection::<User>("users");
        let id = users.insert_one(&john()).await.expect("insert");
        let filter = Filter::id(&id);

        let same = users.replace_one(&filter, &john()).await.expect("replace");
        assert_eq!(same, ReplaceOutcome { matched_count: 1, modified_count: 0 });

        let mut changed = john();
        changed.phone = Some("1-770-736-8031".to_owned());
        let outcome = users.replace_one(&filter, &changed).await.expect("replace");
        assert_eq!(outcome.modified_count, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn replace_rejects_changing_the_key(context: InMemoryDatabaseContext) {
        let users = context.collection::<User>("users");
        let id = users.insert_one(&john()).await.expect("insert");
        let other = UserId::new("65f1c0ffee0000000000beef").expect("valid id");

        let err = users
            .replace_one(&Filter::id(&id), &john().with_id(other))
            .await
            .expect_err("key is immutable");
        assert_eq!(err.kind(), "query");
    }

    #[rstest]
    #[tokio::test]
    async fn increment_upserts_and_counts(context: InMemoryDatabaseContext) {
        let counters = context.collection::<Counter>("counters");

        for expected in 1..=3 {
            let counter = counters
                .find_one_and_update(&Filter::id("userId"), &SEQ, upsert_after())
                .await
                .expect("increment")
                .expect("upserted");
            assert_eq!(counter.seq, expected);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn increment_without_upsert_skips_missing(context: InMemoryDatabaseContext) {
        let counters = context.collection::<Counter>("counters");
        let options = FindOneAndUpdateOptions {
            return_after: true,
            upsert: false,
        };

        let result = counters
            .find_one_and_update(&Filter::id("userId"), &SEQ, options)
            .await
            .expect("increment");
        assert!(result.is_none());
        assert_eq!(context.document_count("counters"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn increment_can_return_the_previous_value(context: InMemoryDatabaseContext) {
        let counters = context.collection::<Counter>("counters");
        let before = FindOneAndUpdateOptions {
            return_after: false,
            upsert: true,
        };
        let filter = Filter::id("userId");

        let created = counters
            .find_one_and_update(&filter, &SEQ, before)
            .await
            .expect("increment");
        assert!(created.is_none());

        let previous = counters
            .find_one_and_update(&filter, &SEQ, before)
            .await
            .expect("increment")
            .expect("existing counter");
        assert_eq!(previous.seq, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn writes_touch_only_the_matching_document(context: InMemoryDatabaseContext) {
        let users = context.collection::<User>("users");
        let first = users.insert_one(&john()).await.expect("insert");
        let second = users.insert_one(&john()).await.expect("insert");
        let mut changed = john();
        changed.phone = Some("1-770-736-8031".to_owned());

        let outcome = users
            .replace_one(&Filter::id(&second), &changed)
            .await
            .expect("replace");
        assert_eq!(outcome.modified_count, 1);
        let untouched = users.find(&Filter::id(&first)).await.expect("find");
        assert_eq!(untouched.first().and_then(|user| user.phone.clone()), None);

        let counters = context.collection::<Counter>("counters");
        for name in ["orders", "invoices", "invoices"] {
            counters
                .find_one_and_update(&Filter::id(name), &SEQ, upsert_after())
                .await
                .expect("increment");
        }
        let orders = counters.find(&Filter::id("orders")).await.expect("find");
        assert_eq!(orders.first().map(|counter| counter.seq), Some(1));
    }
}
