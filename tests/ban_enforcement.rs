mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{assign_role, create_role, create_user, login, send, setup};

#[tokio::test]
async fn banned_user_is_locked_out_of_every_route() -> Result<()> {
    let t = setup().await?;
    create_user(&t.pool, "Banned", "banned@example.com", "password123", true).await?;

    let token = login(&t.app, "banned@example.com", "password123").await?;

    for (method, uri) in [
        ("GET", "/auth/me"),
        ("GET", "/permissions"),
        ("GET", "/vendors"),
        ("POST", "/permissions"),
    ] {
        let (status, body) = send(&t.app, method, uri, Some(&token), Some(json!({}))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(
            body["message"].as_str(),
            Some("Your account has been banned."),
            "{method} {uri}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn superadmin_role_does_not_override_a_ban() -> Result<()> {
    let t = setup().await?;
    let user = create_user(&t.pool, "Banned Root", "root@example.com", "password123", true).await?;
    let role = create_role(&t.pool, "superadmin").await?;
    assign_role(&t.pool, user, role).await?;

    let token = login(&t.app, "root@example.com", "password123").await?;

    let (status, body) = send(&t.app, "GET", "/vendors", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"].as_str(), Some("Your account has been banned."));

    Ok(())
}

#[tokio::test]
async fn ban_takes_effect_on_the_next_request() -> Result<()> {
    let t = setup().await?;
    let user = create_user(&t.pool, "Member", "member@example.com", "password123", false).await?;
    let token = login(&t.app, "member@example.com", "password123").await?;

    let (status, _) = send(&t.app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE users SET banned = 1 WHERE id = ?")
        .bind(user.to_string())
        .execute(&t.pool)
        .await?;

    // the token is still valid; the ban is re-checked per request
    let (status, _) = send(&t.app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}
