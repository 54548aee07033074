use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::Principal;
use crate::errors::{AppError, AppResult};
use crate::models::flash::Flash;
use crate::models::rbac::parse_id;
use crate::models::vendor::{
    DbVendor, Vendor, VendorCreateRequest, VendorUpdateRequest, VendorWithAudit,
};
use crate::pagination::{Page, PageQuery, PER_PAGE};
use crate::utils::utc_now;
use crate::validation::Validator;

#[derive(Debug, Serialize, ToSchema)]
pub struct VendorStored {
    pub message: String,
    pub vendor: Vendor,
}

#[derive(Debug, FromRow)]
struct DbVendorRow {
    id: String,
    name: String,
    ntn: String,
    status: bool,
    created_by_name: Option<String>,
    updated_by_name: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[utoipa::path(
    get,
    path = "/vendors",
    tag = "Vendors",
    params(PageQuery),
    responses((status = 200, description = "Paginated vendors with audit names, newest first")),
    security(("bearerAuth" = []))
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<VendorWithAudit>>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM vendors")
        .fetch_one(&state.pool)
        .await?;

    let rows = sqlx::query_as::<_, DbVendorRow>(
        r#"
        SELECT v.id, v.name, v.ntn, v.status,
               cu.name AS created_by_name, uu.name AS updated_by_name,
               v.created_at, v.updated_at
        FROM vendors v
        LEFT JOIN users cu ON v.created_by = cu.id
        LEFT JOIN users uu ON v.updated_by = uu.id
        ORDER BY v.created_at DESC, v.id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(PER_PAGE)
    .bind(query.offset())
    .fetch_all(&state.pool)
    .await?;

    let vendors = rows
        .into_iter()
        .map(|row| {
            Ok(VendorWithAudit {
                id: parse_id(&row.id)?,
                name: row.name,
                ntn: row.ntn,
                status: row.status,
                created_by: row.created_by_name,
                updated_by: row.updated_by_name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(Page::new(vendors, query.page(), total, "/vendors")))
}

#[utoipa::path(
    get,
    path = "/vendors/create",
    tag = "Vendors",
    responses((status = 204, description = "Create form needs no reference data")),
    security(("bearerAuth" = []))
)]
pub async fn create_form() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    post,
    path = "/vendors",
    tag = "Vendors",
    request_body = VendorCreateRequest,
    responses(
        (status = 201, description = "Vendor created", body = VendorStored),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn store(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<VendorCreateRequest>,
) -> AppResult<(StatusCode, Json<VendorStored>)> {
    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    v.require_min("ntn", &payload.ntn, 3);
    v.finish()?;

    let id = Uuid::new_v4();
    let now = utc_now();

    // audit columns come from the caller, not the payload
    sqlx::query(
        "INSERT INTO vendors (id, name, ntn, status, created_by, updated_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&payload.name)
    .bind(&payload.ntn)
    .bind(true)
    .bind(principal.id.to_string())
    .bind(principal.id.to_string())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let vendor = Vendor {
        id,
        name: payload.name,
        ntn: payload.ntn,
        status: true,
        created_by: Some(principal.id),
        updated_by: Some(principal.id),
        created_at: now,
        updated_at: now,
    };

    Ok((
        StatusCode::CREATED,
        Json(VendorStored {
            message: "Vendor created successfully".to_string(),
            vendor,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/vendors/{id}/edit",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor to edit", body = Vendor),
        (status = 404, description = "Vendor not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn edit_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Vendor>> {
    let vendor = fetch_vendor(&state.pool, id).await?;
    Ok(Json(vendor))
}

#[utoipa::path(
    put,
    path = "/vendors/{id}",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = VendorUpdateRequest,
    responses(
        (status = 200, description = "Vendor updated", body = VendorStored),
        (status = 404, description = "Vendor not found"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<VendorUpdateRequest>,
) -> AppResult<Json<VendorStored>> {
    let mut vendor = fetch_vendor(&state.pool, id).await?;

    let mut v = Validator::new();
    v.require_min("name", &payload.name, 3);
    v.require_min("ntn", &payload.ntn, 3);
    v.require("status", payload.status.is_some());
    v.finish()?;

    let status = payload.status.unwrap_or(vendor.status);
    let now = utc_now();

    sqlx::query(
        "UPDATE vendors SET name = ?, ntn = ?, status = ?, updated_by = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&payload.name)
    .bind(&payload.ntn)
    .bind(status)
    .bind(principal.id.to_string())
    .bind(now)
    .bind(id.to_string())
    .execute(&state.pool)
    .await?;

    vendor.name = payload.name;
    vendor.ntn = payload.ntn;
    vendor.status = status;
    vendor.updated_by = Some(principal.id);
    vendor.updated_at = now;

    Ok(Json(VendorStored {
        message: "Vendor updated successfully".to_string(),
        vendor,
    }))
}

#[utoipa::path(
    delete,
    path = "/vendors/{id}/delete",
    tag = "Vendors",
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses((status = 200, description = "Deleted, or a not-found error flash", body = Flash)),
    security(("bearerAuth" = []))
)]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Flash>> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM vendors WHERE id = ?")
        .bind(id.to_string())
        .fetch_one(&state.pool)
        .await?;

    if existing == 0 {
        return Ok(Json(Flash::error("Vendor not found")));
    }

    sqlx::query("DELETE FROM vendors WHERE id = ?")
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    Ok(Json(Flash::success("Vendor deleted successfully")))
}

async fn fetch_vendor(pool: &SqlitePool, id: Uuid) -> AppResult<Vendor> {
    let row = sqlx::query_as::<_, DbVendor>(
        "SELECT id, name, ntn, status, created_by, updated_by, created_at, updated_at FROM vendors WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Vendor not found"))?;

    row.try_into()
}
