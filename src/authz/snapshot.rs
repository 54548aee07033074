use std::collections::HashSet;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::AppResult;

/// Per-request flattened view of a principal's roles and permissions.
///
/// Built fresh on every authenticated request and never cached across
/// requests, so role/permission edits take effect on the editee's next
/// request without any invalidation machinery.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub roles: HashSet<String>,
    pub permissions: HashSet<String>,
}

/// One assigned role with its granted permission names, as loaded from the
/// store. Input to the pure flattening step.
#[derive(Debug, Clone)]
pub struct RoleGrant {
    pub name: String,
    pub permissions: Vec<String>,
}

impl Snapshot {
    /// The snapshot of an unauthenticated caller: both sets empty, which
    /// downstream treats as "no access", never as an error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pure transformation: collect role names, flatten and deduplicate all
    /// permission names across roles. Order is irrelevant.
    pub fn from_grants(grants: impl IntoIterator<Item = RoleGrant>) -> Self {
        let mut roles = HashSet::new();
        let mut permissions = HashSet::new();
        for grant in grants {
            roles.insert(grant.name);
            permissions.extend(grant.permissions);
        }
        Self { roles, permissions }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Load the assigned roles (with their permissions) for a user and flatten
/// them. Two queries per request; nothing is cached.
pub async fn load_snapshot(pool: &SqlitePool, user_id: Uuid) -> AppResult<Snapshot> {
    let role_rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT r.id, r.name
        FROM roles r
        INNER JOIN user_roles ur ON r.id = ur.role_id
        WHERE ur.user_id = ?
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    let perm_rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT rp.role_id, p.name
        FROM permissions p
        INNER JOIN role_permissions rp ON p.id = rp.permission_id
        INNER JOIN user_roles ur ON rp.role_id = ur.role_id
        WHERE ur.user_id = ?
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    let grants = role_rows.into_iter().map(|(role_id, name)| RoleGrant {
        name,
        permissions: perm_rows
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .map(|(_, perm)| perm.clone())
            .collect(),
    });

    Ok(Snapshot::from_grants(grants))
}
