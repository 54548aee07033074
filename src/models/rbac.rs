use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

// =============================================================================
// PERMISSION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPermission {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbPermission> for Permission {
    type Error = AppError;

    fn try_from(value: DbPermission) -> Result<Self, Self::Error> {
        Ok(Permission {
            id: parse_id(&value.id)?,
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// Body for both store and update; a permission is just a unique name,
/// conventionally two words ("resource action").
#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionPayload {
    #[schema(example = "view vendors")]
    pub name: String,
}

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRole {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbRole> for Role {
    type Error = AppError;

    fn try_from(value: DbRole) -> Result<Self, Self::Error> {
        Ok(Role {
            id: parse_id(&value.id)?,
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// List-view shape: the role plus the id/name of each granted permission.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleWithPermissions {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub permissions: Vec<PermissionRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionRef {
    pub id: Uuid,
    pub name: String,
}

/// Body for both store and update. The permission list, when present, is
/// synced wholesale: the role ends up with exactly this set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RolePayload {
    #[schema(example = "editor")]
    pub name: String,
    pub permissions: Option<Vec<Uuid>>,
}

/// Reference data for the role create/edit form.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleFormData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Permission ids currently granted to the role being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub haspermissions: Option<Vec<Uuid>>,
    /// Every permission, for the form's checkbox list.
    pub permissions: Vec<Permission>,
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|err| AppError::internal(format!("malformed id in store: {err}")))
}
