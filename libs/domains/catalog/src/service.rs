//! Catalog Service - Business logic layer

use std::sync::Arc;

use mongodb::bson::{self, Document};
use tracing::instrument;
use validator::Validate;

use crate::enrich::{BusinessDirectory, summary_projection};
use crate::error::{CatalogError, CatalogResult};
use crate::id::EntityId;
use crate::models::{
    BusinessFilter, CatalogCollection, NewBusiness, NewPromotion, PromotionFilter,
    PromotionStatusUpdate,
};
use crate::normalize::normalize_document;
use crate::store::{DocumentStore, FindQuery};

/// Catalog service providing business logic operations
///
/// Validates input before any store call and returns documents in their
/// normalized form.
pub struct CatalogService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a business and return its identifier
    #[instrument(skip(self, input), fields(business_name = %input.name))]
    pub async fn create_business(&self, input: NewBusiness) -> CatalogResult<EntityId> {
        input.validate()?;

        let id = self
            .store
            .insert(
                CatalogCollection::Business,
                input.into_document(bson::DateTime::now()),
            )
            .await?;

        tracing::info!(business_id = %id, "Business created");
        Ok(id)
    }

    /// List businesses matching the filter
    #[instrument(skip(self))]
    pub async fn list_businesses(&self, filter: BusinessFilter) -> CatalogResult<Vec<Document>> {
        filter.validate()?;

        let query = FindQuery::new(filter.compile()).with_limit(filter.effective_limit());
        let documents = self.store.find(CatalogCollection::Business, query).await?;

        tracing::debug!(count = documents.len(), "Businesses listed");
        Ok(documents.into_iter().map(normalize_document).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_business(&self, id: EntityId) -> CatalogResult<Document> {
        self.get(CatalogCollection::Business, id).await
    }

    /// Create a promotion for an existing business
    ///
    /// The existence check and the insert are separate store calls; a business
    /// created or removed in between is not detected.
    #[instrument(skip(self, input), fields(business_id = %input.business_id))]
    pub async fn create_promotion(&self, input: NewPromotion) -> CatalogResult<EntityId> {
        input.validate()?;
        let business_id: EntityId = input.business_id.parse()?;

        if self
            .store
            .find_one(CatalogCollection::Business, business_id)
            .await?
            .is_none()
        {
            return Err(CatalogError::BusinessNotFound(business_id));
        }

        let id = self
            .store
            .insert(
                CatalogCollection::Promotion,
                input.into_document(business_id, bson::DateTime::now()),
            )
            .await?;

        tracing::info!(promotion_id = %id, "Promotion created");
        Ok(id)
    }

    /// List promotions matching the filter, enriched with business attributes
    #[instrument(skip(self))]
    pub async fn list_promotions(&self, filter: PromotionFilter) -> CatalogResult<Vec<Document>> {
        filter.validate()?;

        let query = FindQuery::new(filter.compile()).with_limit(filter.effective_limit());
        let mut promotions: Vec<Document> = self
            .store
            .find(CatalogCollection::Promotion, query)
            .await?
            .into_iter()
            .map(normalize_document)
            .collect();

        if promotions.is_empty() {
            return Ok(promotions);
        }

        let businesses = FindQuery::new(Document::new()).with_projection(summary_projection());
        match self.store.find(CatalogCollection::Business, businesses).await {
            Ok(documents) => {
                let directory = BusinessDirectory::from_documents(documents);
                directory.enrich_all(&mut promotions);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Business lookup failed, returning promotions unenriched");
            }
        }

        tracing::debug!(count = promotions.len(), "Promotions listed");
        Ok(promotions)
    }

    #[instrument(skip(self))]
    pub async fn get_promotion(&self, id: EntityId) -> CatalogResult<Document> {
        self.get(CatalogCollection::Promotion, id).await
    }

    /// Apply a status update and return the updated promotion
    #[instrument(skip(self))]
    pub async fn set_promotion_status(
        &self,
        id: EntityId,
        update: PromotionStatusUpdate,
    ) -> CatalogResult<Document> {
        update.validate()?;

        let mut changes = update.into_fields();
        if changes.is_empty() {
            return Err(CatalogError::InvalidInput("No fields to update".to_string()));
        }
        changes.insert("updated_at", bson::DateTime::now());

        let matched = self
            .store
            .update_fields(CatalogCollection::Promotion, id, changes)
            .await?;
        if matched == 0 {
            return Err(CatalogError::not_found(CatalogCollection::Promotion, id));
        }

        tracing::info!(promotion_id = %id, "Promotion status updated");
        self.get(CatalogCollection::Promotion, id).await
    }

    async fn get(&self, collection: CatalogCollection, id: EntityId) -> CatalogResult<Document> {
        self.store
            .find_one(collection, id)
            .await?
            .map(normalize_document)
            .ok_or_else(|| CatalogError::not_found(collection, id))
    }
}

impl<S: DocumentStore> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActiveFilter, MAX_LIMIT};
    use crate::store::MockDocumentStore;
    use mongodb::bson::{doc, oid::ObjectId};

    fn new_promotion(business_id: &str) -> NewPromotion {
        serde_json::from_value(serde_json::json!({
            "business_id": business_id,
            "title": "Sale",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_promotion_for_missing_business_writes_nothing() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .withf(|collection, _| *collection == CatalogCollection::Business)
            .times(1)
            .returning(|_, _| Ok(None));
        store.expect_insert().never();

        let service = CatalogService::new(store);
        let business_id = EntityId::generate();
        let err = service
            .create_promotion(new_promotion(&business_id.to_hex()))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::BusinessNotFound(id) if id == business_id));
    }

    #[tokio::test]
    async fn test_create_promotion_with_malformed_reference_skips_store() {
        let mut store = MockDocumentStore::new();
        store.expect_find_one().never();
        store.expect_insert().never();

        let service = CatalogService::new(store);
        let err = service
            .create_promotion(new_promotion("not-an-id"))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_create_promotion_stores_canonical_reference() {
        let business_id = EntityId::generate();
        let promotion_id = EntityId::generate();

        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .returning(move |_, id| Ok(Some(doc! { "_id": id, "name": "Acme" })));
        store
            .expect_insert()
            .withf(move |collection, document| {
                *collection == CatalogCollection::Promotion
                    && document
                        .get_str("business_id")
                        .is_ok_and(|stored| stored == business_id.to_hex())
                    && document.get_bool("is_active").is_ok_and(|active| active)
            })
            .times(1)
            .returning(move |_, _| Ok(promotion_id));

        let service = CatalogService::new(store);
        let id = service
            .create_promotion(new_promotion(&business_id.to_hex().to_uppercase()))
            .await
            .unwrap();

        assert_eq!(id, promotion_id);
    }

    #[tokio::test]
    async fn test_invalid_business_is_rejected_before_store() {
        let mut store = MockDocumentStore::new();
        store.expect_insert().never();

        let service = CatalogService::new(store);
        let input: NewBusiness =
            serde_json::from_value(serde_json::json!({ "name": "" })).unwrap();
        let err = service.create_business(input).await.unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_status_update_fails_before_store() {
        let mut store = MockDocumentStore::new();
        store.expect_update_fields().never();
        store.expect_find_one().never();

        let service = CatalogService::new(store);
        let err = service
            .set_promotion_status(EntityId::generate(), PromotionStatusUpdate::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::InvalidInput(msg) if msg == "No fields to update"));
    }

    #[tokio::test]
    async fn test_status_update_of_unknown_promotion_is_not_found() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update_fields()
            .withf(|_, _, changes| {
                changes.get_bool("is_active").is_ok_and(|active| !active)
                    && changes.contains_key("updated_at")
            })
            .times(1)
            .returning(|_, _, _| Ok(0));
        store.expect_find_one().never();

        let service = CatalogService::new(store);
        let err = service
            .set_promotion_status(
                EntityId::generate(),
                PromotionStatusUpdate {
                    is_active: Some(false),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::NotFound {
                collection: CatalogCollection::Promotion,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_status_update_returns_normalized_document() {
        let id = EntityId::generate();

        let mut store = MockDocumentStore::new();
        store.expect_update_fields().returning(|_, _, _| Ok(1));
        store
            .expect_find_one()
            .returning(move |_, id| Ok(Some(doc! { "_id": id, "is_active": false })));

        let service = CatalogService::new(store);
        let updated = service
            .set_promotion_status(
                id,
                PromotionStatusUpdate {
                    is_active: Some(false),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.get_str("id").unwrap(), id.to_hex());
        assert!(!updated.get_bool("is_active").unwrap());
    }

    #[tokio::test]
    async fn test_list_promotions_passes_compiled_filter_and_limit() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .withf(|collection, query| {
                *collection == CatalogCollection::Promotion
                    && query.filter == doc! { "is_active": true }
                    && query.limit == Some(100)
            })
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = CatalogService::new(store);
        let promotions = service
            .list_promotions(PromotionFilter::default())
            .await
            .unwrap();

        assert!(promotions.is_empty());
    }

    #[tokio::test]
    async fn test_list_promotions_enriches_with_one_business_fetch() {
        let business = ObjectId::new();
        let business_hex = business.to_hex();

        let mut store = MockDocumentStore::new();
        let promotion_business = business_hex.clone();
        store
            .expect_find()
            .withf(|collection, _| *collection == CatalogCollection::Promotion)
            .times(1)
            .returning(move |_, _| {
                Ok(vec![
                    doc! { "_id": ObjectId::new(), "business_id": promotion_business.as_str(), "title": "Sale" },
                    doc! { "_id": ObjectId::new(), "business_id": "65f1c0ffee0000000000dead", "title": "Ghost" },
                ])
            });
        store
            .expect_find()
            .withf(|collection, query| {
                *collection == CatalogCollection::Business
                    && query.filter.is_empty()
                    && query.projection == Some(summary_projection())
            })
            .times(1)
            .returning(move |_, _| {
                Ok(vec![doc! { "_id": business, "name": "Acme", "industry": "Retail" }])
            });

        let service = CatalogService::new(store);
        let promotions = service
            .list_promotions(PromotionFilter {
                active: ActiveFilter::Any,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(promotions.len(), 2);
        assert_eq!(promotions[0].get_str("business_name").unwrap(), "Acme");
        assert_eq!(promotions[0].get_str("industry").unwrap(), "Retail");
        assert!(!promotions[1].contains_key("business_name"));
        assert!(!promotions[1].contains_key("industry"));
    }

    #[tokio::test]
    async fn test_list_promotions_survives_business_fetch_failure() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .withf(|collection, _| *collection == CatalogCollection::Promotion)
            .returning(|_, _| {
                Ok(vec![doc! { "_id": ObjectId::new(), "business_id": "b1", "title": "Sale" }])
            });
        store
            .expect_find()
            .withf(|collection, _| *collection == CatalogCollection::Business)
            .returning(|_, _| Err(CatalogError::StoreUnavailable("timeout".into())));

        let service = CatalogService::new(store);
        let promotions = service
            .list_promotions(PromotionFilter::default())
            .await
            .unwrap();

        assert_eq!(promotions.len(), 1);
        assert!(!promotions[0].contains_key("business_name"));
    }

    #[tokio::test]
    async fn test_oversized_limit_is_capped() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .withf(|_, query| query.limit == Some(MAX_LIMIT))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = CatalogService::new(store);
        let businesses = service
            .list_businesses(BusinessFilter {
                limit: 5000,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(businesses.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_limit_is_rejected_before_store() {
        let mut store = MockDocumentStore::new();
        store.expect_find().never();

        let service = CatalogService::new(store);
        let err = service
            .list_businesses(BusinessFilter {
                limit: 0,
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_missing_business_is_not_found() {
        let mut store = MockDocumentStore::new();
        store.expect_find_one().returning(|_, _| Ok(None));

        let service = CatalogService::new(store);
        let err = service
            .get_business(EntityId::generate())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Business not found");
    }
}
