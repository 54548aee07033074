use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::gate::is_allowed;
use super::snapshot::{load_snapshot, Snapshot};
use crate::errors::{AppError, AppResult};

/// The authenticated caller for one request, carrying a freshly built
/// snapshot. Threaded explicitly through the guard chain and handlers via
/// request extensions; there is no ambient current-user state.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub banned: bool,
    pub snapshot: Snapshot,
}

impl Principal {
    pub async fn load(pool: &SqlitePool, user_id: Uuid) -> AppResult<Self> {
        let row: Option<(String, String, String, bool)> =
            sqlx::query_as("SELECT id, name, email, banned FROM users WHERE id = ?")
                .bind(user_id.to_string())
                .fetch_optional(pool)
                .await?;

        let (_, name, email, banned) = row.ok_or_else(|| AppError::unauthorized("unknown user"))?;
        let snapshot = load_snapshot(pool, user_id).await?;

        Ok(Self {
            id: user_id,
            name,
            email,
            banned,
            snapshot,
        })
    }

    pub fn can(&self, permission: &str) -> bool {
        is_allowed(&self.snapshot, permission)
    }

    /// Synthetic principal for unit tests of the guard chain.
    #[cfg(test)]
    pub fn synthetic(snapshot: Snapshot, banned: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            email: "test@example.com".to_string(),
            banned,
            snapshot,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("request is not authenticated"))
    }
}
