//! In-process DocumentStore for tests and local runs.
//!
//! Evaluates the predicate subset the filter compiler emits: `$and`, `$or`,
//! `$regex` (with the `i` option) and plain equality, where equality against
//! an array field means membership.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use regex::RegexBuilder;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::id::EntityId;
use crate::models::CatalogCollection;
use crate::store::{DocumentStore, FindQuery};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<CatalogCollection, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored in `collection`.
    pub async fn count(&self, collection: CatalogCollection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn matches(document: &Document, filter: &Document) -> CatalogResult<bool> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(condition)? {
                    all &= matches(document, sub)?;
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(condition)? {
                    any |= matches(document, sub)?;
                }
                any
            }
            field => field_matches(document.get(field), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters(condition: &Bson) -> CatalogResult<Vec<&Document>> {
    let Bson::Array(items) = condition else {
        return Err(CatalogError::Database(
            "logical operator expects an array".to_string(),
        ));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(sub) => Ok(sub),
            _ => Err(CatalogError::Database(
                "logical operator expects documents".to_string(),
            )),
        })
        .collect()
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> CatalogResult<bool> {
    if let Bson::Document(operator) = condition {
        if let Ok(pattern) = operator.get_str("$regex") {
            let case_insensitive = operator
                .get_str("$options")
                .is_ok_and(|options| options.contains('i'));
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            return Ok(matches!(value, Some(Bson::String(s)) if regex.is_match(s)));
        }
    }

    Ok(match value {
        Some(Bson::Array(items)) => items.contains(condition) || value == Some(condition),
        Some(value) => value == condition,
        None => *condition == Bson::Null,
    })
}

fn project(document: &Document, projection: Option<&Document>) -> Document {
    let Some(projection) = projection else {
        return document.clone();
    };

    document
        .iter()
        .filter(|(key, _)| {
            key.as_str() == "_id"
                || projection.get(key.as_str()).is_some_and(|flag| match flag {
                    Bson::Int32(n) => *n != 0,
                    Bson::Int64(n) => *n != 0,
                    Bson::Boolean(b) => *b,
                    _ => false,
                })
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn has_id(document: &Document, id: EntityId) -> bool {
    matches!(document.get("_id"), Some(Bson::ObjectId(oid)) if *oid == id.as_object_id())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: CatalogCollection,
        document: Document,
    ) -> CatalogResult<EntityId> {
        let id = EntityId::generate();

        let mut stored = Document::new();
        stored.insert("_id", id);
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }

        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn find(
        &self,
        collection: CatalogCollection,
        query: FindQuery,
    ) -> CatalogResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let limit = query.limit.map_or(usize::MAX, |n| n as usize);
        let mut found = Vec::new();
        for document in documents {
            if found.len() >= limit {
                break;
            }
            if matches(document, &query.filter)? {
                found.push(project(document, query.projection.as_ref()));
            }
        }
        Ok(found)
    }

    async fn find_one(
        &self,
        collection: CatalogCollection,
        id: EntityId,
    ) -> CatalogResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|d| has_id(d, id)))
            .cloned())
    }

    async fn update_fields(
        &self,
        collection: CatalogCollection,
        id: EntityId,
        changes: Document,
    ) -> CatalogResult<u64> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|d| has_id(d, id)));

        match target {
            Some(document) => {
                for (key, value) in changes {
                    document.insert(key, value);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
