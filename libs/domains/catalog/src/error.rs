use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::ErrorKind;
use thiserror::Error;
use validator::ValidationErrors;

use crate::id::{EntityId, InvalidId};
use crate::models::CatalogCollection;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Business {0} does not exist")]
    BusinessNotFound(EntityId),

    #[error("{} not found", .collection.label())]
    NotFound {
        collection: CatalogCollection,
        id: EntityId,
    },

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(collection: CatalogCollection, id: EntityId) -> Self {
        Self::NotFound { collection, id }
    }
}

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidId(e) => AppError::InvalidId(e.to_string()),
            CatalogError::Validation(e) => AppError::ValidationError(e),
            CatalogError::InvalidInput(msg) => AppError::InvalidInput(msg),
            e @ CatalogError::BusinessNotFound(_) => AppError::InvalidReference(e.to_string()),
            e @ CatalogError::NotFound { .. } => AppError::NotFound(e.to_string()),
            CatalogError::StoreUnavailable(msg) => AppError::ServiceUnavailable(msg),
            CatalogError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. } => {
                CatalogError::StoreUnavailable(err.to_string())
            }
            _ => CatalogError::Database(err.to_string()),
        }
    }
}
