//! Wires the catalog domain to MongoDB.

use axum::Router;
use domain_catalog::{CatalogService, MongoDocumentStore, handlers};

use crate::state::AppState;

pub fn store(state: &AppState) -> MongoDocumentStore {
    MongoDocumentStore::new(state.db.clone())
}

/// Create catalog router
pub fn router(state: &AppState) -> Router {
    handlers::router(CatalogService::new(store(state)))
}
