//! Catalog Domain
//!
//! Businesses and the promotions they run, stored as schemaless documents in
//! MongoDB and served over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, JSON rendering
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, referential check, enrichment
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────────────────────┐
//! │DocumentStore│  ←  │ filter · normalize · enrich│
//! └──────┬──────┘     └────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   MongoDB   │  ← or the in-memory store in tests
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{CatalogService, MongoDocumentStore, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let store = MongoDocumentStore::new(client.database("catalog"));
//! store.init_indexes().await?;
//!
//! let router = handlers::router(CatalogService::new(store));
//! # Ok(())
//! # }
//! ```

pub mod enrich;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod id;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod normalize;
pub mod service;
pub mod store;

pub use crate::mongodb::MongoDocumentStore;
pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use id::{EntityId, InvalidId};
pub use memory::MemoryDocumentStore;
pub use models::{
    ActiveFilter, BusinessFilter, CatalogCollection, NewBusiness, NewPromotion, PromotionFilter,
    PromotionStatusUpdate,
};
pub use service::CatalogService;
pub use store::{DocumentStore, FindQuery};
