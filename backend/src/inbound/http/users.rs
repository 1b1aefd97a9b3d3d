//! Users API handlers.
//!
//! ```text
//! GET    /api/user
//! GET    /api/user/{id}
//! POST   /api/user {"name":"John Doe","username":"johndoe","email":"johndoe@example.com"}
//! PUT    /api/user/{id}
//! DELETE /api/user/{id}
//! ```

use actix_web::{HttpResponse, delete, get, http::header, post, put, web};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::info;

use crate::domain::{Error, User, validate_user};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::map_store_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_service_error, parse_user_id, validation_error};

/// Path prefix every handler here is mounted under.
pub const USERS_PATH: &str = "/api/user";

/// PUT body. Any `id` it carries, well-formed or not, is discarded; the path
/// id is assigned instead.
#[derive(Debug, Deserialize)]
pub struct ReplaceUserBody {
    #[serde(default, rename = "id")]
    _ignored_id: Option<IgnoredAny>,
    #[serde(flatten)]
    user: User,
}

impl ReplaceUserBody {
    /// The user to store, without any body id.
    pub fn into_user(self) -> User {
        self.user
    }
}

fn not_found(id: &str) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// List every user.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/user")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list_users().await.map_err(map_store_error)?;
    Ok(web::Json(users))
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id" = String, Path, description = "24-character hexadecimal object id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/user/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    state
        .users
        .get_user(id.as_ref())
        .await
        .map_err(map_store_error)?
        .map(web::Json)
        .ok_or_else(|| not_found(id.as_ref()))
}

/// Create a user; the store assigns the id.
#[utoipa::path(
    post,
    path = "/api/user",
    request_body = User,
    responses(
        (
            status = 201,
            description = "Created",
            headers(("Location" = String, description = "URL of the new user")),
            body = User
        ),
        (status = 400, description = "Invalid user", body = Error),
        (status = 409, description = "Id already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/user")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<User>,
) -> ApiResult<HttpResponse> {
    let created = state
        .users_command
        .create_user(payload.into_inner())
        .await
        .map_err(map_service_error)?;
    let mut response = HttpResponse::Created();
    if let Some(id) = &created.id {
        info!(user_id = %id, "user created");
        response.insert_header((header::LOCATION, format!("{USERS_PATH}/{id}")));
    }
    Ok(response.json(created))
}

/// Replace a user. The path id overrides any id in the body.
#[utoipa::path(
    put,
    path = "/api/user/{id}",
    params(("id" = String, Path, description = "24-character hexadecimal object id")),
    request_body = User,
    responses(
        (status = 204, description = "Replaced"),
        (status = 400, description = "Invalid user or malformed id", body = Error),
        (status = 404, description = "Not found or unchanged", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/user/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReplaceUserBody>,
) -> ApiResult<HttpResponse> {
    let user = payload.into_inner().into_user();
    validate_user(&user).map_err(|report| validation_error(&report))?;
    let id = parse_user_id(&path)?;
    let modified = state
        .users_command
        .update_user(id.as_ref(), user.with_id(id.clone()))
        .await
        .map_err(map_service_error)?;
    if modified {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(not_found(id.as_ref()))
    }
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/user/{id}",
    params(("id" = String, Path, description = "24-character hexadecimal object id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/user/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let deleted = state
        .users_command
        .delete_user(id.as_ref())
        .await
        .map_err(map_store_error)?;
    if deleted {
        info!(user_id = %id, "user deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(not_found(id.as_ref()))
    }
}

/// Register every users handler on `cfg`; mount under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}
