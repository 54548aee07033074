use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::{AppError, AppResult};
use crate::models::user::{AuthResponse, DbUser, LoginRequest, User};
use crate::utils::verify_password;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

/// The per-request role/permission view shared with the client UI so it can
/// hide controls the caller cannot use. Always recomputed; the server-side
/// gate remains the authority.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
    /// Assigned role names.
    pub r: Vec<String>,
    /// Flattened permission names across all assigned roles.
    pub p: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let db_user = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password_hash, banned, created_at, updated_at FROM users WHERE email = ?",
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    let password_ok = verify_password(&payload.password, &db_user.password_hash)?;
    if !password_ok {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let user: User = db_user.try_into()?;
    let token = state.jwt.encode(user.id)?;

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Current user with roles and permissions", body = MeResponse)),
    security(("bearerAuth" = []))
)]
pub async fn me(State(state): State<AppState>, principal: Principal) -> AppResult<Json<MeResponse>> {
    let user = fetch_user(&state.pool, principal.id).await?;

    let mut roles: Vec<String> = principal.snapshot.roles.iter().cloned().collect();
    let mut permissions: Vec<String> = principal.snapshot.permissions.iter().cloned().collect();
    roles.sort();
    permissions.sort();

    Ok(Json(MeResponse {
        user,
        r: roles,
        p: permissions,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged")),
    security(("bearerAuth" = []))
)]
pub async fn logout(_principal: Principal) -> AppResult<Json<MessageResponse>> {
    // Stateless tokens: the client discards its copy.
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

async fn fetch_user(pool: &SqlitePool, user_id: Uuid) -> AppResult<User> {
    let db_user = sqlx::query_as::<_, DbUser>(
        "SELECT id, name, email, password_hash, banned, created_at, updated_at FROM users WHERE id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("user not found"))?;

    db_user.try_into()
}
