use std::collections::BTreeMap;
use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Field-tagged validation failures, keyed by the offending input field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Turn the collected failures into an error, or `Ok` if nothing failed
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("{0}")]
    InvalidOperation(String),

    #[error("Authentication credentials were not provided")]
    Unauthorized,
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    /// Validation failures, if this is a validation error
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Top-level fields of the JSON bodies the API accepts
const PAYLOAD_FIELDS: &[&str] = &["name", "text", "cooking_time", "image", "ingredients", "tags"];

/// Field a body decoding error points at, from its `path: message` detail
///
/// Errors that are not tied to a known field land under `non_field_errors`.
fn rejected_field(detail: &str) -> &'static str {
    let path = detail.split(": ").next().unwrap_or("");
    let head = path.split(['.', '[']).next().unwrap_or("");
    PAYLOAD_FIELDS
        .iter()
        .find(|field| **field == head)
        .copied()
        .unwrap_or("non_field_errors")
}

/// Malformed request bodies are reported like any other invalid input
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        let detail = match text.split_once("target type: ") {
            Some((_, detail)) => detail.to_string(),
            None => text.clone(),
        };
        tracing::warn!("Rejected request body: {}", text);
        AppError::Validation(ValidationErrors::single(rejected_field(&detail), detail))
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(_)
            | AppError::Transaction(_)
            | AppError::Table(_)
            | AppError::Storage(_)
            | AppError::Commit(_)
            | AppError::Serialization(_)
            | AppError::Deserialization(_)
            | AppError::Io(_)
            | AppError::TaskJoin(_)
            | AppError::Json(_) => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Validation(ref errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "errors": errors }),
            ),
            AppError::Conflict(ref msg) | AppError::InvalidOperation(ref msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string() }),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": self.to_string() })),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collects_per_field() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("ingredients", "first");
        errors.add("ingredients", "second");
        errors.add("tags", "third");

        assert!(errors.contains("ingredients"));
        assert_eq!(errors.messages("ingredients").len(), 2);
        assert_eq!(errors.messages("name").len(), 0);
        assert_eq!(errors.to_string(), "ingredients: first, second; tags: third");
    }

    #[test]
    fn test_rejected_field() {
        assert_eq!(
            rejected_field("ingredients[0].amount: invalid type: string \"lots\", expected i64"),
            "ingredients"
        );
        assert_eq!(rejected_field("cooking_time: invalid type: floating point"), "cooking_time");
        assert_eq!(rejected_field("invalid type: string, expected struct"), "non_field_errors");
        assert_eq!(rejected_field("author: unknown"), "non_field_errors");
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let err = ValidationErrors::single("cooking_time", "too small")
            .into_result()
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains("cooking_time"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Conflict("dup".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidOperation("self".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("Recipe".into()), StatusCode::NOT_FOUND),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AppError::Validation(ValidationErrors::single("tags", "x")),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
