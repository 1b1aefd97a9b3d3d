//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::web;
use serde_json::json;

use crate::domain::Error;

pub use error::ApiResult;

/// JSON extractor settings turning malformed bodies into `invalid_request`
/// errors with the standard payload.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request("request body is not a valid user")
            .with_details(json!({ "code": "malformed_body", "reason": err.to_string() }))
            .into()
    })
}

/// Mount the users API under `/api` with the JSON settings applied.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_api::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .configure(users::configure),
    );
}
