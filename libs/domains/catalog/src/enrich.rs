//! Read-time join of promotions with their owning business.

use std::collections::HashMap;

use mongodb::bson::{Bson, Document, doc};

/// Projection applied to the bulk business fetch.
pub fn summary_projection() -> Document {
    doc! { "name": 1, "industry": 1 }
}

/// Display attributes copied onto promotions.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessSummary {
    pub name: Bson,
    pub industry: Bson,
}

/// Business summaries keyed by identifier string.
#[derive(Debug, Default)]
pub struct BusinessDirectory {
    entries: HashMap<String, BusinessSummary>,
}

impl BusinessDirectory {
    /// Build from raw business documents. Documents whose `_id` is not an
    /// `ObjectId` or string are skipped.
    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let entries = documents
            .into_iter()
            .filter_map(|mut document| {
                let key = match document.remove("_id")? {
                    Bson::ObjectId(oid) => oid.to_hex(),
                    Bson::String(s) => s,
                    _ => return None,
                };
                let summary = BusinessSummary {
                    name: document.remove("name").unwrap_or(Bson::Null),
                    industry: document.remove("industry").unwrap_or(Bson::Null),
                };
                Some((key, summary))
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, business_id: &str) -> Option<&BusinessSummary> {
        self.entries.get(business_id)
    }

    /// Attach `business_name` and `industry` when the referenced business is
    /// known. A promotion with a dangling or missing reference is left as is.
    pub fn enrich(&self, promotion: &mut Document) {
        let summary = match promotion.get_str("business_id") {
            Ok(business_id) => self.lookup(business_id),
            Err(_) => None,
        };

        if let Some(summary) = summary {
            promotion.insert("business_name", summary.name.clone());
            promotion.insert("industry", summary.industry.clone());
        }
    }

    pub fn enrich_all(&self, promotions: &mut [Document]) {
        for promotion in promotions.iter_mut() {
            self.enrich(promotion);
        }
    }
}
