use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::flash::Flash;
use crate::models::rbac::{
    DbPermission, DbRole, Permission, PermissionRef, Role, RoleFormData, RolePayload,
    RoleWithPermissions,
};
use crate::pagination::{Page, PageQuery, PER_PAGE};
use crate::utils::utc_now;
use crate::validation::{is_unique, Validator};

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleStored {
    pub message: String,
    pub role: Role,
}

#[utoipa::path(
    get,
    path = "/roles",
    tag = "Roles",
    params(PageQuery),
    responses((status = 200, description = "Paginated roles with their permissions, alphabetical")),
    security(("bearerAuth" = []))
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<RoleWithPermissions>>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM roles")
        .fetch_one(&state.pool)
        .await?;

    let rows = sqlx::query_as::<_, DbRole>(
        "SELECT id, name, created_at, updated_at FROM roles ORDER BY name ASC, id ASC LIMIT ? OFFSET ?",
    )
    .bind(PER_PAGE)
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    let mut roles = Vec::with_capacity(rows.len());
    for row in rows {
        let role: Role = row.try_into()?;
        let permissions = role_permission_refs(&state.pool, role.id).await?;
        roles.push(RoleWithPermissions {
            id: role.id,
            name: role.name,
            created_at: role.created_at,
            updated_at: role.updated_at,
            permissions,
        });
    }

    Ok(Json(Page::new(roles, query.page(), total, "/roles")))
}

#[utoipa::path(
    get,
    path = "/roles/create",
    tag = "Roles",
    responses((status = 200, description = "Reference data for the role form", body = RoleFormData)),
    security(("bearerAuth" = []))
)]
pub async fn create_form(State(state): State<AppState>) -> AppResult<Json<RoleFormData>> {
    Ok(Json(RoleFormData {
        role: None,
        haspermissions: None,
        permissions: all_permissions(&state.pool).await?,
    }))
}

#[utoipa::path(
    post,
    path = "/roles",
    tag = "Roles",
    request_body = RolePayload,
    responses(
        (status = 201, description = "Role created", body = RoleStored),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<RolePayload>,
) -> AppResult<(StatusCode, Json<RoleStored>)> {
    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    if v.is_ok() && !is_unique(&state.pool, "roles", "name", &payload.name, None).await? {
        v.taken("name");
    }
    v.finish()?;

    let id = Uuid::new_v4();
    let now = utc_now();

    let mut tx = state.pool.begin().await?;

    sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(&payload.name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    if let Some(permission_ids) = &payload.permissions {
        sync_role_permissions(&mut tx, id, permission_ids).await?;
    }

    tx.commit().await?;

    let role = Role {
        id,
        name: payload.name,
        created_at: now,
        updated_at: now,
    };

    Ok((
        StatusCode::CREATED,
        Json(RoleStored {
            message: "Role created successfully".to_string(),
            role,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/roles/{id}/edit",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role with granted ids and the full permission list", body = RoleFormData),
        (status = 404, description = "Role not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn edit_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<RoleFormData>> {
    let role = fetch_role(&state.pool, id).await?;
    let haspermissions = role_permission_refs(&state.pool, id)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    Ok(Json(RoleFormData {
        role: Some(role),
        haspermissions: Some(haspermissions),
        permissions: all_permissions(&state.pool).await?,
    }))
}

#[utoipa::path(
    put,
    path = "/roles/{id}",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = RolePayload,
    responses(
        (status = 200, description = "Role updated, permission set synced", body = RoleStored),
        (status = 404, description = "Role not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RolePayload>,
) -> AppResult<Json<RoleStored>> {
    let mut role = fetch_role(&state.pool, id).await?;

    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    if v.is_ok() && !is_unique(&state.pool, "roles", "name", &payload.name, Some(id)).await? {
        v.taken("name");
    }
    v.finish()?;

    let now = utc_now();
    let target = payload.permissions.unwrap_or_default();

    // name change and permission sync land together or not at all
    let mut tx = state.pool.begin().await?;

    sqlx::query("UPDATE roles SET name = ?, updated_at = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    sync_role_permissions(&mut tx, id, &target).await?;

    tx.commit().await?;

    role.name = payload.name;
    role.updated_at = now;

    Ok(Json(RoleStored {
        message: "Role updated successfully".to_string(),
        role,
    }))
}

#[utoipa::path(
    delete,
    path = "/roles/{id}/delete",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses((status = 200, description = "Deleted, or a not-found error flash", body = Flash)),
    security(("bearerAuth" = []))
)]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Flash>> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM roles WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&state.pool)
        .await?;

    if existing == 0 {
        return Ok(Json(Flash::error("Role not found")));
    }

    sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    Ok(Json(Flash::success("Role deleted successfully")))
}

/// Wholesale replacement of a role's permission set: diff against the current
/// grants and apply only the difference, so concurrent readers never observe
/// an emptied-out intermediate state.
async fn sync_role_permissions(
    tx: &mut Transaction<'_, Sqlite>,
    role_id: Uuid,
    target: &[Uuid],
) -> AppResult<()> {
    let current: Vec<String> =
        sqlx::query_scalar("SELECT permission_id FROM role_permissions WHERE role_id = ?")
            .bind(role_id.to_string())
            .fetch_all(&mut **tx)
            .await?;

    let current: HashSet<String> = current.into_iter().collect();
    let target: HashSet<String> = target.iter().map(|id| id.to_string()).collect();

    for removed in current.difference(&target) {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = ? AND permission_id = ?")
            .bind(role_id.to_string())
            .bind(removed)
            .execute(&mut **tx)
            .await?;
    }

    let now = utc_now();
    for added in target.difference(&current) {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(role_id.to_string())
        .bind(added)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn fetch_role(pool: &SqlitePool, id: Uuid) -> AppResult<Role> {
    let row = sqlx::query_as::<_, DbRole>(
        "SELECT id, name, created_at, updated_at FROM roles WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Role not found"))?;

    row.try_into()
}

async fn all_permissions(pool: &SqlitePool) -> AppResult<Vec<Permission>> {
    let rows = sqlx::query_as::<_, DbPermission>(
        "SELECT id, name, created_at, updated_at FROM permissions ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Permission::try_from).collect()
}

async fn role_permission_refs(pool: &SqlitePool, role_id: Uuid) -> AppResult<Vec<PermissionRef>> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT p.id, p.name
        FROM permissions p
        INNER JOIN role_permissions rp ON p.id = rp.permission_id
        WHERE rp.role_id = ?
        ORDER BY p.name ASC
        "#,
    )
    .bind(role_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, name)| {
            Ok(PermissionRef {
                id: crate::models::rbac::parse_id(&id)?,
                name,
            })
        })
        .collect()
}
