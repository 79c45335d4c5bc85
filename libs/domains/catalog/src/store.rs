use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::CatalogResult;
use crate::id::EntityId;
use crate::models::CatalogCollection;

/// A compiled read: predicate, optional projection and row cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Option<Document>,
    pub limit: Option<u32>,
}

impl FindQuery {
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    pub fn with_projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document store gateway
///
/// Raw document primitives over the catalog collections. Implementations
/// assign identifiers on insert and return documents exactly as stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its assigned identifier
    async fn insert(
        &self,
        collection: CatalogCollection,
        document: Document,
    ) -> CatalogResult<EntityId>;

    /// Documents matching the query, in store iteration order
    async fn find(
        &self,
        collection: CatalogCollection,
        query: FindQuery,
    ) -> CatalogResult<Vec<Document>>;

    /// Document with the given identifier
    async fn find_one(
        &self,
        collection: CatalogCollection,
        id: EntityId,
    ) -> CatalogResult<Option<Document>>;

    /// `$set` the given fields; returns the number of matched documents
    async fn update_fields(
        &self,
        collection: CatalogCollection,
        id: EntityId,
        fields: Document,
    ) -> CatalogResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_find_query_builder() {
        let query = FindQuery::new(doc! { "is_active": true })
            .with_projection(doc! { "name": 1 })
            .with_limit(10);

        assert_eq!(query.filter, doc! { "is_active": true });
        assert_eq!(query.projection, Some(doc! { "name": 1 }));
        assert_eq!(query.limit, Some(10));
        assert_eq!(FindQuery::default().limit, None);
    }
}
