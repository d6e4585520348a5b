/// User administration handlers
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AuthError, Result},
    http::{CurrentUser, Superuser},
    models::{RoleUpdateRequest, UserResponse},
    AppState,
};

use super::auth::ErrorResponse;

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// List users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(Pagination),
    responses(
        (status = 200, description = "Page of users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>> {
    let users = state
        .users
        .list(page.skip.max(0), page.limit.clamp(1, 100))
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch a user; callers may read themselves, superusers may read anyone
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>> {
    if current.user.id != id && !current.user.is_superuser {
        return Err(AuthError::PermissionDenied);
    }

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    Ok(Json(user.into()))
}

/// Deactivate an account. Their tokens keep decoding but every
/// authenticated surface rejects the account until it is reactivated.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 403, description = "Superuser required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    _admin: Superuser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.users.set_active(id, false).await?;
    tracing::info!("User deactivated: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Reactivate a previously deactivated account
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/activate",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account reactivated", body = UserResponse),
        (status = 403, description = "Superuser required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn activate_user(
    State(state): State<AppState>,
    _admin: Superuser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>> {
    let user = state.users.set_active(id, true).await?;
    tracing::info!("User reactivated: {}", id);
    Ok(Json(user.into()))
}

/// Grant or revoke the superuser role
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/role",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 403, description = "Superuser required", body = ErrorResponse),
        (status = 404, description = "No such user", body = ErrorResponse)
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    _admin: Superuser,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdateRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.users.set_superuser(id, payload.is_superuser).await?;
    tracing::info!(
        "Superuser flag for user {} set to {}",
        id,
        payload.is_superuser
    );
    Ok(Json(user.into()))
}
