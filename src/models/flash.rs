use serde::Serialize;
use utoipa::ToSchema;

/// One-shot outcome message carried in the response body, standing in for
/// the redirect-with-flash pattern of a server-rendered admin panel.
#[derive(Debug, Serialize, ToSchema)]
pub struct Flash {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Permission created successfully")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Permission not found")]
    pub error: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(message.into()),
        }
    }
}
