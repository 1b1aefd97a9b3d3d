//! Application configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USER_API_*` environment variables and
//! configuration files, in that order of precedence. Every field except the
//! connection string override carries a default, so the service starts with
//! no configuration at all.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{CollectionNames, CollectionNamesError};
use crate::domain::user_service::{DEFAULT_COUNTERS_COLLECTION, DEFAULT_USERS_COLLECTION};

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 27017;
const DEFAULT_DB_NAME: &str = "users";
const DEFAULT_APPLICATION_NAME: &str = "user-api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised when settings are individually well-formed but unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error(transparent)]
    CollectionNames(#[from] CollectionNamesError),
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
}

/// Runtime configuration for the user API.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_API")]
pub struct AppSettings {
    /// MongoDB host name.
    #[ortho_config(default = String::from(DEFAULT_DB_HOST))]
    pub db_host: String,
    /// MongoDB port.
    #[ortho_config(default = DEFAULT_DB_PORT)]
    pub db_port: u16,
    /// Database holding the users and counters collections.
    #[ortho_config(default = String::from(DEFAULT_DB_NAME))]
    pub db_name: String,
    /// Full connection string; overrides host, port and application name.
    pub database_uri: Option<String>,
    /// Application name reported to the server.
    #[ortho_config(default = String::from(DEFAULT_APPLICATION_NAME))]
    pub application_name: String,
    /// Users collection name.
    #[ortho_config(default = String::from(DEFAULT_USERS_COLLECTION))]
    pub users_collection: String,
    /// Counters collection name.
    #[ortho_config(default = String::from(DEFAULT_COUNTERS_COLLECTION))]
    pub counters_collection: String,
    /// HTTP listen address.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            db_host: DEFAULT_DB_HOST.to_owned(),
            db_port: DEFAULT_DB_PORT,
            db_name: DEFAULT_DB_NAME.to_owned(),
            database_uri: None,
            application_name: DEFAULT_APPLICATION_NAME.to_owned(),
            users_collection: DEFAULT_USERS_COLLECTION.to_owned(),
            counters_collection: DEFAULT_COUNTERS_COLLECTION.to_owned(),
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
        }
    }
}

impl AppSettings {
    /// Connection string, either the explicit override or one assembled as
    /// `mongodb://{host}:{port}/?appName={application_name}`.
    ///
    /// # Examples
    /// ```
    /// use user_api::settings::AppSettings;
    ///
    /// let settings = AppSettings {
    ///     db_host: "mongo".to_owned(),
    ///     ..AppSettings::default()
    /// };
    /// assert_eq!(
    ///     settings.connection_uri(),
    ///     "mongodb://mongo:27017/?appName=user-api"
    /// );
    /// ```
    pub fn connection_uri(&self) -> String {
        match &self.database_uri {
            Some(uri) => uri.clone(),
            None => format!(
                "mongodb://{}:{}/?appName={}",
                self.db_host, self.db_port, self.application_name
            ),
        }
    }

    /// Validated collection names.
    ///
    /// # Errors
    /// Returns [`SettingsError::CollectionNames`] when either name is blank.
    pub fn collection_names(&self) -> Result<CollectionNames, SettingsError> {
        Ok(CollectionNames::new(
            self.users_collection.as_str(),
            self.counters_collection.as_str(),
        )?)
    }

    /// Parsed listen address.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] for anything that is not
    /// `host:port` with a literal IP.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_str();
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "USER_API_DB_HOST",
        "USER_API_DB_PORT",
        "USER_API_DB_NAME",
        "USER_API_DATABASE_URI",
        "USER_API_APPLICATION_NAME",
        "USER_API_USERS_COLLECTION",
        "USER_API_COUNTERS_COLLECTION",
        "USER_API_BIND_ADDR",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("user-api")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.connection_uri(),
            "mongodb://localhost:27017/?appName=user-api"
        );
        assert_eq!(settings.db_name, DEFAULT_DB_NAME);
        assert_eq!(settings.database_uri, None);
        assert_eq!(
            settings.collection_names().expect("defaults are valid"),
            CollectionNames::default()
        );
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal address")
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_API_DB_HOST", Some("mongo.internal".to_owned())),
            ("USER_API_DB_PORT", Some("27018".to_owned())),
            ("USER_API_DB_NAME", Some("people".to_owned())),
            ("USER_API_DATABASE_URI", None),
            ("USER_API_APPLICATION_NAME", Some("users-svc".to_owned())),
            ("USER_API_USERS_COLLECTION", Some("members".to_owned())),
            ("USER_API_COUNTERS_COLLECTION", Some("sequences".to_owned())),
            ("USER_API_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.connection_uri(),
            "mongodb://mongo.internal:27018/?appName=users-svc"
        );
        assert_eq!(settings.db_name, "people");
        let names = settings.collection_names().expect("valid names");
        assert_eq!((names.users(), names.counters()), ("members", "sequences"));
        assert_eq!(
            settings.bind_addr().expect("valid address").port(),
            9000
        );
    }

    #[rstest]
    fn explicit_uri_wins() {
        let settings = AppSettings {
            db_host: "ignored".to_owned(),
            database_uri: Some("mongodb://replica-a,replica-b/?replicaSet=rs0".to_owned()),
            ..AppSettings::default()
        };
        assert_eq!(
            settings.connection_uri(),
            "mongodb://replica-a,replica-b/?replicaSet=rs0"
        );
    }

    #[rstest]
    fn blank_collection_name_is_fatal() {
        let settings = AppSettings {
            counters_collection: String::new(),
            ..AppSettings::default()
        };
        assert_eq!(
            settings.collection_names(),
            Err(SettingsError::CollectionNames(
                CollectionNamesError::EmptyCounters
            ))
        );
    }

    #[rstest]
    fn malformed_bind_addr_is_rejected() {
        let settings = AppSettings {
            bind_addr: "localhost".to_owned(),
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
