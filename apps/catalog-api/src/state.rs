//! Shared application state.

use mongodb::{Client, Database};

/// Cloned into each handler; the MongoDB handles share one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// Catalog database
    pub db: Database,
}
