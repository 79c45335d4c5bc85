//! Typed identifier path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::fmt::Display;
use std::str::FromStr;

/// Extracts a single path parameter and parses it with [`FromStr`].
///
/// A value that fails to parse is rejected with [`AppError::InvalidId`] (400).
///
/// # Example
/// ```ignore
/// use axum::{Router, routing::get};
/// use axum_helpers::IdPath;
///
/// async fn get_business(IdPath(id): IdPath<EntityId>) -> String {
///     format!("business {id}")
/// }
///
/// let app = Router::new().route("/business/{id}", get(get_business));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    T: FromStr,
    T::Err: Display,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidId(e.body_text()))?;

        raw.parse::<T>()
            .map(IdPath)
            .map_err(|e| AppError::InvalidId(e.to_string()))
    }
}
