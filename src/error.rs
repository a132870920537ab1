use serde::Serialize;
use thiserror::Error;

use crate::attachment::AttachmentError;
use crate::db::DatabaseError;

/// Service-layer error surfaced to the command front end.
#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected before any write.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        AppError::Database(DatabaseError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Serialized form for callers that report errors as data.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ErrorReport {
    Validation(String),
    Storage(String),
    Attachment(String),
}

impl From<&AppError> for ErrorReport {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Validation(msg) => ErrorReport::Validation(msg.clone()),
            AppError::Database(e) => ErrorReport::Storage(e.to_string()),
            AppError::Attachment(e) => ErrorReport::Attachment(e.to_string()),
            AppError::Io(e) => ErrorReport::Storage(e.to_string()),
        }
    }
}

// Conversion to String for command return types
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.to_string()
    }
}

/// Result type alias for services
pub type AppResult<T> = Result<T, AppError>;
