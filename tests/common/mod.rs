#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use vendorgate::create_app;
use vendorgate::utils::{hash_password, utc_now};

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

/// Tempfile SQLite database + migrations + the full router.
pub async fn setup() -> Result<TestApp> {
    let dir = tempfile::tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");

    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    // tests run in CI/container; ensure a JWT secret is available for signing tokens
    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    Ok(TestApp {
        app,
        pool,
        _dir: dir,
    })
}

pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
    banned: bool,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = utc_now();
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, banned, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(banned)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn create_role(pool: &SqlitePool, name: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = utc_now();
    sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn create_permission(pool: &SqlitePool, name: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = utc_now();
    sqlx::query("INSERT INTO permissions (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn grant_permission(pool: &SqlitePool, role_id: Uuid, permission_id: Uuid) -> Result<()> {
    sqlx::query("INSERT INTO role_permissions (role_id, permission_id, created_at) VALUES (?, ?, ?)")
        .bind(role_id.to_string())
        .bind(permission_id.to_string())
        .bind(utc_now())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn assign_role(pool: &SqlitePool, user_id: Uuid, role_id: Uuid) -> Result<()> {
    sqlx::query("INSERT INTO user_roles (user_id, role_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id.to_string())
        .bind(role_id.to_string())
        .bind(utc_now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Log in through the API and return the bearer token.
pub async fn login(app: &Router, email: &str, password: &str) -> Result<String> {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await?;

    if status != StatusCode::OK {
        anyhow::bail!("login failed: {} - {}", status, body);
    }

    body.get("token")
        .and_then(|v| v.as_str())
        .map(String::from)
        .context("missing token")
}

/// Fire one request and parse the JSON response (empty bodies become null).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    json: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let req = match json {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let resp: Response = app.clone().oneshot(req).await?;
    let status = resp.status();
    let body_bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes)?
    };

    Ok((status, value))
}
