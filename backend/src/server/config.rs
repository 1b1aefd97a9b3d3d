//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use user_api::domain::ports::{UsersCommand, UsersQuery};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) users: Arc<dyn UsersQuery>,
    pub(crate) users_command: Arc<dyn UsersCommand>,
}

impl ServerConfig {
    /// Construct a server configuration around one service implementing both
    /// user ports.
    #[must_use]
    pub fn new<S>(bind_addr: SocketAddr, service: Arc<S>) -> Self
    where
        S: UsersQuery + UsersCommand + 'static,
    {
        Self {
            bind_addr,
            users: service.clone(),
            users_command: service,
        }
    }
}
