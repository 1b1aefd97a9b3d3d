//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: MongoDB and in-memory document stores
//!
//! Adapters are thin translators between domain types and storage
//! representations. They contain no business logic.

pub mod persistence;
