//! MongoDB implementation of DocumentStore

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::FindOptions,
};
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::id::EntityId;
use crate::models::CatalogCollection;
use crate::store::{DocumentStore, FindQuery};

/// MongoDB implementation of the DocumentStore
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let store = MongoDocumentStore::new(client.database("catalog"));
    /// ```
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn collection(&self, collection: CatalogCollection) -> Collection<Document> {
        self.db.collection::<Document>(collection.as_ref())
    }

    /// Create the secondary indexes promotion listings filter on.
    #[instrument(skip(self))]
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = ["business_id", "is_active", "tags"]
            .into_iter()
            .map(|field| {
                let mut keys = Document::new();
                keys.insert(field, 1);
                IndexModel::builder().keys(keys).build()
            })
            .collect::<Vec<_>>();

        self.collection(CatalogCollection::Promotion)
            .create_indexes(indexes)
            .await?;

        tracing::info!("Promotion indexes initialized");
        Ok(())
    }

    fn find_options(query: &FindQuery) -> FindOptions {
        FindOptions::builder()
            .projection(query.projection.clone())
            .limit(query.limit.map(i64::from))
            .build()
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    #[instrument(skip(self, document), fields(collection = %collection))]
    async fn insert(
        &self,
        collection: CatalogCollection,
        document: Document,
    ) -> CatalogResult<EntityId> {
        let result = self.collection(collection).insert_one(document).await?;

        let id = result
            .inserted_id
            .as_object_id()
            .map(EntityId::from)
            .ok_or_else(|| {
                CatalogError::Database(format!(
                    "unexpected inserted id type: {}",
                    result.inserted_id
                ))
            })?;

        tracing::debug!(id = %id, "Document inserted");
        Ok(id)
    }

    #[instrument(skip(self, query), fields(collection = %collection, limit = ?query.limit))]
    async fn find(
        &self,
        collection: CatalogCollection,
        query: FindQuery,
    ) -> CatalogResult<Vec<Document>> {
        let options = Self::find_options(&query);

        let cursor = self
            .collection(collection)
            .find(query.filter)
            .with_options(options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        tracing::debug!(count = documents.len(), "Documents fetched");
        Ok(documents)
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn find_one(
        &self,
        collection: CatalogCollection,
        id: EntityId,
    ) -> CatalogResult<Option<Document>> {
        let document = self
            .collection(collection)
            .find_one(doc! { "_id": id })
            .await?;
        Ok(document)
    }

    #[instrument(skip(self, changes), fields(collection = %collection))]
    async fn update_fields(
        &self,
        collection: CatalogCollection,
        id: EntityId,
        changes: Document,
    ) -> CatalogResult<u64> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": changes })
            .await?;
        Ok(result.matched_count)
    }
}
