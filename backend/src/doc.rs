//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the users and health handlers plus the domain schemas.
//! Swagger UI serves it in debug builds and `cargo run --bin openapi-dump`
//! prints it for external tooling.

use utoipa::OpenApi;

use crate::domain::{Address, Company, Error, ErrorCode, Geo, User};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User API",
        description = "CRUD access to users stored in MongoDB, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(User, Address, Geo, Company, Error, ErrorCode)),
    tags(
        (name = "users", description = "User CRUD operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
