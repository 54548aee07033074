mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{assign_role, create_permission, create_user, login, send, setup};

async fn role_permission_names(pool: &sqlx::SqlitePool, role_id: &str) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT p.name FROM permissions p INNER JOIN role_permissions rp ON p.id = rp.permission_id WHERE rp.role_id = ? ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

#[tokio::test]
async fn permission_set_is_replaced_wholesale() -> Result<()> {
    let t = setup().await?;
    create_user(&t.pool, "Admin", "admin@example.com", "password123", false).await?;
    let token = login(&t.app, "admin@example.com", "password123").await?;

    let p1 = create_permission(&t.pool, "view vendors").await?;
    let p2 = create_permission(&t.pool, "edit vendors").await?;

    // create editor role granting both
    let (status, body) = send(
        &t.app,
        "POST",
        "/roles",
        Some(&token),
        Some(json!({ "name": "editor", "permissions": [p1, p2] })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "role create failed: {body}");
    let role_id = body["role"]["id"].as_str().unwrap().to_string();

    assert_eq!(
        role_permission_names(&t.pool, &role_id).await?,
        vec!["edit vendors", "view vendors"]
    );

    // re-sync with the smaller set: the dropped grant must disappear
    let (status, body) = send(
        &t.app,
        "PUT",
        &format!("/roles/{role_id}"),
        Some(&token),
        Some(json!({ "name": "editor", "permissions": [p2] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "role update failed: {body}");

    assert_eq!(
        role_permission_names(&t.pool, &role_id).await?,
        vec!["edit vendors"]
    );

    // omitting the list on update clears the set entirely
    let (status, _) = send(
        &t.app,
        "PUT",
        &format!("/roles/{role_id}"),
        Some(&token),
        Some(json!({ "name": "editor" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(role_permission_names(&t.pool, &role_id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn snapshot_reflects_role_edits_on_the_next_request() -> Result<()> {
    let t = setup().await?;
    let admin = create_user(&t.pool, "Admin", "admin@example.com", "password123", false).await?;
    let token = login(&t.app, "admin@example.com", "password123").await?;

    let p1 = create_permission(&t.pool, "view vendors").await?;
    let p2 = create_permission(&t.pool, "edit vendors").await?;

    let (_, body) = send(
        &t.app,
        "POST",
        "/roles",
        Some(&token),
        Some(json!({ "name": "editor", "permissions": [p1, p2] })),
    )
    .await?;
    let role_id: Uuid = body["role"]["id"].as_str().unwrap().parse()?;
    assign_role(&t.pool, admin, role_id).await?;

    let (_, body) = send(&t.app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(body["r"], json!(["editor"]));
    assert_eq!(body["p"], json!(["edit vendors", "view vendors"]));

    // shrink the role's grants; the very next request sees the change
    let (status, _) = send(
        &t.app,
        "PUT",
        &format!("/roles/{role_id}"),
        Some(&token),
        Some(json!({ "name": "editor", "permissions": [p2] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(body["p"], json!(["edit vendors"]));

    Ok(())
}

#[tokio::test]
async fn deleting_a_permission_cascades_out_of_roles() -> Result<()> {
    let t = setup().await?;
    create_user(&t.pool, "Admin", "admin@example.com", "password123", false).await?;
    let token = login(&t.app, "admin@example.com", "password123").await?;

    let p1 = create_permission(&t.pool, "view vendors").await?;
    let p2 = create_permission(&t.pool, "edit vendors").await?;

    let (_, body) = send(
        &t.app,
        "POST",
        "/roles",
        Some(&token),
        Some(json!({ "name": "editor", "permissions": [p1, p2] })),
    )
    .await?;
    let role_id = body["role"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &t.app,
        "DELETE",
        &format!("/permissions/{p1}/delete"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        role_permission_names(&t.pool, &role_id).await?,
        vec!["edit vendors"]
    );

    Ok(())
}

#[tokio::test]
async fn role_names_are_unique_and_destroy_missing_is_soft() -> Result<()> {
    let t = setup().await?;
    create_user(&t.pool, "Admin", "admin@example.com", "password123", false).await?;
    let token = login(&t.app, "admin@example.com", "password123").await?;

    let (status, _) = send(
        &t.app,
        "POST",
        "/roles",
        Some(&token),
        Some(json!({ "name": "editor" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &t.app,
        "POST",
        "/roles",
        Some(&token),
        Some(json!({ "name": "editor" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let ghost = Uuid::new_v4();
    let (status, body) = send(
        &t.app,
        "DELETE",
        &format!("/roles/{ghost}/delete"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"].as_str(), Some("Role not found"));

    Ok(())
}
