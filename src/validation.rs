//! Field validation in the validate -> persist -> respond pattern.
//!
//! Rules are checked up front and reported together as a 422 with per-field
//! messages. Uniqueness pre-checks here are inherently racy; the UNIQUE
//! constraints in the schema are the real backstop, and a slip-through
//! surfaces as a generic database failure.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, FieldErrors};

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// required + minimum length, counted in characters.
    pub fn require_min(&mut self, field: &str, value: &str, min: usize) {
        if value.trim().is_empty() {
            self.add(field, format!("The {field} field is required."));
        } else if value.chars().count() < min {
            self.add(field, format!("The {field} must be at least {min} characters."));
        }
    }

    pub fn require(&mut self, field: &str, present: bool) {
        if !present {
            self.add(field, format!("The {field} field is required."));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("The {field} field is required."));
        } else if !looks_like_email(value) {
            self.add(field, format!("The {field} must be a valid email address."));
        }
    }

    pub fn confirmed(&mut self, field: &str, value: &str, confirmation: &str) {
        if value != confirmation {
            self.add(field, format!("The {field} confirmation does not match."));
        }
    }

    pub fn taken(&mut self, field: &str) {
        self.add(field, format!("The {field} has already been taken."));
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Repository-wide uniqueness among *other* records: on update the record's
/// own id is excluded so saving an unchanged name does not self-conflict.
pub async fn is_unique(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<Uuid>,
) -> AppResult<bool> {
    let count: i64 = match exclude_id {
        Some(id) => {
            let sql = format!("SELECT COUNT(1) FROM {table} WHERE {column} = ? AND id != ?");
            sqlx::query_scalar(&sql)
                .bind(value)
                .bind(id.to_string())
                .fetch_one(pool)
                .await?
        }
        None => {
            let sql = format!("SELECT COUNT(1) FROM {table} WHERE {column} = ?");
            sqlx::query_scalar(&sql).bind(value).fetch_one(pool).await?
        }
    };

    Ok(count == 0)
}

fn looks_like_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
