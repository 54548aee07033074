use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::rbac::parse_id;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    /// National tax number.
    pub ntn: String,
    pub status: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbVendor {
    pub id: String,
    pub name: String,
    pub ntn: String,
    pub status: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbVendor> for Vendor {
    type Error = AppError;

    fn try_from(value: DbVendor) -> Result<Self, Self::Error> {
        Ok(Vendor {
            id: parse_id(&value.id)?,
            name: value.name,
            ntn: value.ntn,
            status: value.status,
            created_by: value.created_by.as_deref().map(parse_id).transpose()?,
            updated_by: value.updated_by.as_deref().map(parse_id).transpose()?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// List-view shape: the vendor plus the names behind the audit columns.
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorWithAudit {
    pub id: Uuid,
    pub name: String,
    pub ntn: String,
    pub status: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorCreateRequest {
    #[schema(example = "Acme Supplies")]
    pub name: String,
    #[schema(example = "1234567-8")]
    pub ntn: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VendorUpdateRequest {
    pub name: String,
    pub ntn: String,
    /// Required on update (active/inactive toggle).
    pub status: Option<bool>,
}
