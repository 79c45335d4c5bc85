//! Store-assigned entity identifiers.

use mongodb::bson::{Bson, oid::ObjectId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a business or promotion.
///
/// Wraps the store's `ObjectId`; parsed from and rendered as 24-character hex.
///
/// ```
/// use domain_catalog::EntityId;
///
/// let id: EntityId = "65f1c0ffee0000000000abcd".parse().unwrap();
/// assert_eq!(id.to_string(), "65f1c0ffee0000000000abcd");
/// assert!("not-an-id".parse::<EntityId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(ObjectId);

/// The input is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid id format: '{0}'")]
pub struct InvalidId(pub String);

impl EntityId {
    /// Fresh identifier, as the store would assign on insert.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl FromStr for EntityId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidId(s.to_string()))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl From<ObjectId> for EntityId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<EntityId> for Bson {
    fn from(id: EntityId) -> Self {
        Bson::ObjectId(id.0)
    }
}
