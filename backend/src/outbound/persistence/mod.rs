//! Document persistence adapters.
//!
//! Concrete implementations of the [`DatabaseContext`] port:
//!
//! - **MongoDB**: [`MongoDbContext`] backed by the official async driver.
//! - **In-memory**: [`InMemoryDatabaseContext`] for tests and local runs.
//!
//! Both share one codec, so identifier handling (`id` on entities, `_id` in
//! storage, object ids as 24 hex characters) is identical. Driver failures
//! are mapped to [`DocumentStoreError`] variants; duplicate keys stay
//! distinguishable from infrastructure faults.
//!
//! [`DatabaseContext`]: crate::domain::ports::DatabaseContext
//! [`DocumentStoreError`]: crate::domain::ports::DocumentStoreError
//!
//! # Example
//!
//! ```no_run
//! use user_api::outbound::persistence::{MongoConfig, MongoDbContext};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MongoConfig::new("mongodb://localhost:27017", "users_db");
//! let context = MongoDbContext::connect(config).await?;
//! context.ping().await?;
//! # Ok(())
//! # }
//! ```

mod document_codec;
mod in_memory;
mod mongo_context;
mod mongo_error_mapping;

pub use in_memory::InMemoryDatabaseContext;
pub use mongo_context::{MongoConfig, MongoContextError, MongoDbContext};
