mod common;

use anyhow::Result;
use axum::http::StatusCode;

use common::{send, setup};

#[tokio::test]
async fn health_endpoint_reports_database_status() -> Result<()> {
    let t = setup().await?;

    let (status, body) = send(&t.app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"].as_str(), Some("ok"));
    assert_eq!(body["db_ok"], serde_json::json!(true));

    Ok(())
}
