use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::rbac::{parse_id, Role};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = AppError;

    fn try_from(value: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_id(&value.id)?,
            name: value.name,
            email: value.email,
            banned: value.banned,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// List-view shape: the user plus the names of their assigned roles.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithRoles {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCreateRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub banned: bool,
    /// Role ids to assign; synced wholesale.
    pub roles: Option<Vec<Uuid>>,
}

/// Update never touches the password unless one is explicitly resubmitted.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserUpdateRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub banned: bool,
    pub roles: Option<Vec<Uuid>>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Reference data for the user create/edit form.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserFormData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Role ids currently assigned to the user being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hasroles: Option<Vec<Uuid>>,
    /// Every role, for the form's checkbox list.
    pub roles: Vec<Role>,
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
