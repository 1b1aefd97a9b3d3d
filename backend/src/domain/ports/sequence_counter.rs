//! Driving port for named monotonic sequences.

use async_trait::async_trait;

use super::DocumentStoreError;
use crate::domain::Counter;

/// Atomically advanced counters.
///
/// Concurrent increments of one name never return the same value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SequenceCounter: Send + Sync {
    /// Add one to `name`, creating it at zero first when absent, and return
    /// the counter after the increment.
    async fn increment_sequence(&self, name: &str) -> Result<Counter, DocumentStoreError>;
}
