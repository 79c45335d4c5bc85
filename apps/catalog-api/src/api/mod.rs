//! API routes module

pub mod catalog;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Routes nested under `/api` by `axum_helpers::create_router`
pub fn routes(state: &AppState) -> Router {
    Router::new().merge(catalog::router(state))
}
