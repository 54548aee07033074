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
use crate::models::rbac::{DbRole, Role};
use crate::models::user::{
    DbUser, User, UserCreateRequest, UserFormData, UserUpdateRequest, UserWithRoles,
};
use crate::pagination::{Page, PageQuery, PER_PAGE};
use crate::utils::{hash_password, utc_now};
use crate::validation::{is_unique, Validator};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStored {
    pub message: String,
    pub user: User,
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(PageQuery),
    responses((status = 200, description = "Paginated users with role names, newest first")),
    security(("bearerAuth" = []))
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<UserWithRoles>>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await?;

    let rows = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password_hash, banned, created_at, updated_at FROM users ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
    )
    .bind(PER_PAGE)
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    let mut users = Vec::with_capacity(rows.len());
    for row in rows {
        let user: User = row.try_into()?;
        let roles: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            INNER JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = ?
            ORDER BY r.name ASC
            "#,
        )
        .bind(user.id.to_string())
        .fetch_all(&state.pool)
        .await?;

        users.push(UserWithRoles {
            id: user.id,
            name: user.name,
            email: user.email,
            banned: user.banned,
            created_at: user.created_at,
            updated_at: user.updated_at,
            roles,
        });
    }

    Ok(Json(Page::new(users, query.page(), total, "/users")))
}

#[utoipa::path(
    get,
    path = "/users/create",
    tag = "Users",
    responses((status = 200, description = "Reference data for the user form", body = UserFormData)),
    security(("bearerAuth" = []))
)]
pub async fn create_form(State(state): State<AppState>) -> AppResult<Json<UserFormData>> {
    Ok(Json(UserFormData {
        user: None,
        hasroles: None,
        roles: all_roles(&state.pool).await?,
    }))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = UserStored),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn store(
    State(state): State<AppState>,
    Json(payload): Json<UserCreateRequest>,
) -> AppResult<(StatusCode, Json<UserStored>)> {
    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    v.email("email", &payload.email);
    v.require_min("password", &payload.password, 6);
    v.confirmed("password", &payload.password, &payload.confirm_password);
    if v.is_ok() && !is_unique(&state.pool, "users", "email", &payload.email, None).await? {
        v.taken("email");
    }
    v.finish()?;

    let id = Uuid::new_v4();
    let now = utc_now();
    let password_hash = hash_password(&payload.password)?;
    let roles = payload.roles.unwrap_or_default();

    let mut tx = state.pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, banned, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(payload.banned)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sync_user_roles(&mut tx, id, &roles).await?;

    tx.commit().await?;

    let user = User {
        id,
        name: payload.name,
        email: payload.email,
        banned: payload.banned,
        created_at: now,
        updated_at: now,
    };

    Ok((
        StatusCode::CREATED,
        Json(UserStored {
            message: "User added successfully".to_string(),
            user,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/users/{id}/edit",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User with assigned role ids and the full role list", body = UserFormData),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn edit_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<UserFormData>> {
    let user = fetch_user(&state.pool, id).await?;

    let hasroles: Vec<String> = sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = ?")
        .bind(id.to_string())
        .fetch_all(&state.pool)
        .await?;
    let hasroles = hasroles
        .iter()
        .map(|raw| crate::models::rbac::parse_id(raw))
        .collect::<Result<Vec<Uuid>, _>>()?;

    Ok(Json(UserFormData {
        user: Some(user),
        hasroles: Some(hasroles),
        roles: all_roles(&state.pool).await?,
    }))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated, role set synced", body = UserStored),
        (status = 404, description = "User not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdateRequest>,
) -> AppResult<Json<UserStored>> {
    let mut user = fetch_user(&state.pool, id).await?;

    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    v.email("email", &payload.email);

    // password only changes when explicitly resubmitted
    let new_password = payload.password.as_deref().filter(|p| !p.is_empty());
    if let Some(password) = new_password {
        v.require_min("password", password, 6);
        v.confirmed("password", password, payload.confirm_password.as_deref().unwrap_or(""));
    }

    if v.is_ok() && !is_unique(&state.pool, "users", "email", &payload.email, Some(id)).await? {
        v.taken("email");
    }
    v.finish()?;

    let now = utc_now();
    let roles = payload.roles.unwrap_or_default();

    let mut tx = state.pool.begin().await?;

    sqlx::query("UPDATE users SET name = ?, email = ?, banned = ?, updated_at = ? WHERE id = ?")
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(payload.banned)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    if let Some(password) = new_password {
        let password_hash = hash_password(password)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    sync_user_roles(&mut tx, id, &roles).await?;

    tx.commit().await?;

    user.name = payload.name;
    user.email = payload.email;
    user.banned = payload.banned;
    user.updated_at = now;

    Ok(Json(UserStored {
        message: "User updated successfully".to_string(),
        user,
    }))
}

/// Wholesale replacement of a user's role set, same diff discipline as the
/// role/permission sync.
async fn sync_user_roles(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: Uuid,
    target: &[Uuid],
) -> AppResult<()> {
    let current: Vec<String> = sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_all(&mut **tx)
        .await?;

    let current: HashSet<String> = current.into_iter().collect();
    let target: HashSet<String> = target.iter().map(|id| id.to_string()).collect();

    for removed in current.difference(&target) {
        sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
            .bind(user_id.to_string())
            .bind(removed)
            .execute(&mut **tx)
            .await?;
    }

    let now = utc_now();
    for added in target.difference(&current) {
        sqlx::query("INSERT INTO user_roles (user_id, role_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id.to_string())
            .bind(added)
            .bind(now)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn fetch_user(pool: &SqlitePool, id: Uuid) -> AppResult<User> {
    let row = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password_hash, banned, created_at, updated_at FROM users WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    row.try_into()
}

async fn all_roles(pool: &SqlitePool) -> AppResult<Vec<Role>> {
    let rows = sqlx::query_as::<_, DbRole>(
        "SELECT id, name, created_at, updated_at FROM roles ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Role::try_from).collect()
}
