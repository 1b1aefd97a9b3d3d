//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;
mod sequence_counter;
mod users_command;
mod users_query;

pub use document_store::{
    DatabaseContext, DeleteOutcome, DocumentCollection, DocumentStoreError, Entity, Filter,
    FindOneAndUpdateOptions, KeyKind, ReplaceOutcome, Update,
};
#[cfg(test)]
pub use sequence_counter::MockSequenceCounter;
pub use sequence_counter::SequenceCounter;
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::{UserServiceError, UsersCommand};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
