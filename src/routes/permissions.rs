use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::flash::Flash;
use crate::models::rbac::{DbPermission, Permission, PermissionPayload};
use crate::pagination::{Page, PageQuery, PER_PAGE};
use crate::utils::utc_now;
use crate::validation::{is_unique, Validator};

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionStored {
    pub message: String,
    pub permission: Permission,
}

#[utoipa::path(
    get,
    path = "/permissions",
    tag = "Permissions",
    params(PageQuery),
    responses((status = 200, description = "Paginated permissions, newest first")),
    security(("bearerAuth" = []))
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Permission>>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM permissions")
        .fetch_one(&state.pool)
        .await?;

    // id tiebreak keeps pagination stable when rows share a created_at
    let rows = sqlx::query_as::<_, DbPermission>(
        "SELECT id, name, created_at, updated_at FROM permissions ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
    )
    .bind(PER_PAGE)
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    let permissions: Vec<Permission> = rows
        .into_iter()
        .map(Permission::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(Page::new(permissions, query.page(), total, "/permissions")))
}

#[utoipa::path(
    get,
    path = "/permissions/create",
    tag = "Permissions",
    responses((status = 204, description = "Create form needs no reference data")),
    security(("bearerAuth" = []))
)]
pub async fn create_form() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/permissions",
    tag = "Permissions",
    request_body = PermissionPayload,
    responses(
        (status = 201, description = "Permission created", body = PermissionStored),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<PermissionPayload>,
) -> AppResult<(StatusCode, Json<PermissionStored>)> {
    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    if v.is_ok() && !is_unique(&state.pool, "permissions", "name", &payload.name, None).await? {
        v.taken("name");
    }
    v.finish()?;

    let id = Uuid::new_v4();
    let now = utc_now();

    sqlx::query("INSERT INTO permissions (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(&payload.name)
        .bind(now)
        .bind(now)
        .execute(&state.pool)
        .await?;

    let permission = Permission {
        id,
        name: payload.name,
        created_at: now,
        updated_at: now,
    };

    Ok((
        StatusCode::CREATED,
        Json(PermissionStored {
            message: "Permission created successfully".to_string(),
            permission,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/permissions/{id}/edit",
    tag = "Permissions",
    params(("id" = Uuid, Path, description = "Permission id")),
    responses(
        (status = 200, description = "Permission to edit", body = Permission),
        (status = 404, description = "Permission not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Permission>> {
    let permission = fetch_permission(&state.pool, id).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    put,
    path = "/permissions/{id}",
    tag = "Permissions",
    params(("id" = Uuid, Path, description = "Permission id")),
    request_body = PermissionPayload,
    responses(
        (status = 200, description = "Permission renamed", body = PermissionStored),
        (status = 404, description = "Permission not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PermissionPayload>,
) -> AppResult<Json<PermissionStored>> {
    let mut permission = fetch_permission(&state.pool, id).await?;

    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    // unique among *other* permissions: renaming to the current name is fine
    if v.is_ok() && !is_unique(&state.pool, "permissions", "name", &payload.name, Some(id)).await? {
        v.taken("name");
    }
    v.finish()?;

    let now = utc_now();
    sqlx::query("UPDATE permissions SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(now)
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    permission.name = payload.name;
    permission.updated_at = now;

    Ok(Json(PermissionStored {
        message: "Permission updated successfully".to_string(),
        permission,
    }))
}

#[utoipa::path(
    delete,
    path = "/permissions/{id}/delete",
    tag = "Permissions",
    params(("id" = Uuid, Path, description = "Permission id")),
    responses((status = 200, description = "Deleted, or a not-found error flash", body = Flash)),
    security(("bearerAuth" = []))
)]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Flash>> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM permissions WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&state.pool)
        .await?;

    if existing == 0 {
        // destroy-not-found is a user-visible flash, not a hard failure
        return Ok(Json(Flash::error("Permission not found")));
    }

    // role_permissions rows cascade away with the permission
    sqlx::query("DELETE FROM permissions WHERE id = ?")
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    Ok(Json(Flash::success("Permission deleted successfully")))
}

async fn fetch_permission(pool: &SqlitePool, id: Uuid) -> AppResult<Permission> {
    let row = sqlx::query_as::<_, DbPermission>(
        "SELECT id, name, created_at, updated_at FROM permissions WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Permission not found"))?;

    row.try_into()
}
