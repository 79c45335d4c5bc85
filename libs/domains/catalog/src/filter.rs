//! Compiles optional search criteria into a single store predicate.
//!
//! Each supplied criterion contributes one clause; clauses are combined with
//! `$and`. With no criteria the predicate is `{}` and matches every document.

use mongodb::bson::{Document, doc};

use crate::id::EntityId;
use crate::models::{BusinessFilter, PromotionFilter};

pub const BUSINESS_TEXT_FIELDS: [&str; 3] = ["name", "description", "industry"];
pub const PROMOTION_TEXT_FIELDS: [&str; 3] = ["title", "description", "terms"];

/// Case-insensitive literal substring match of `q` against any of `fields`.
pub fn text_clause(q: &str, fields: &[&str]) -> Document {
    let pattern = regex::escape(q);
    let alternatives: Vec<Document> = fields
        .iter()
        .map(|field| {
            let mut clause = Document::new();
            clause.insert(*field, doc! { "$regex": &pattern, "$options": "i" });
            clause
        })
        .collect();
    doc! { "$or": alternatives }
}

/// Conjunction of `clauses`, collapsing the trivial cases.
pub fn combine(mut clauses: Vec<Document>) -> Document {
    match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl BusinessFilter {
    pub fn compile(&self) -> Document {
        let mut clauses = Vec::new();
        if let Some(q) = present(&self.q) {
            clauses.push(text_clause(q, &BUSINESS_TEXT_FIELDS));
        }
        combine(clauses)
    }
}

impl PromotionFilter {
    pub fn compile(&self) -> Document {
        let mut clauses = Vec::new();

        if let Some(q) = present(&self.q) {
            clauses.push(text_clause(q, &PROMOTION_TEXT_FIELDS));
        }

        if let Some(tag) = present(&self.tag) {
            clauses.push(doc! { "tags": tag });
        }

        if let Some(business_id) = present(&self.business_id) {
            // Stored references are canonical hex; match any casing the client used.
            let canonical = business_id
                .parse::<EntityId>()
                .map(|id| id.to_hex())
                .unwrap_or_else(|_| business_id.to_string());
            clauses.push(doc! { "business_id": canonical });
        }

        if let Some(flag) = self.active.as_flag() {
            clauses.push(doc! { "is_active": flag });
        }

        combine(clauses)
    }
}
