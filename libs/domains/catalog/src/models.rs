use chrono::{NaiveDate, NaiveTime};
use mongodb::bson::{self, Bson, Document, doc};
use serde::{Deserialize, Deserializer, Serialize, de};
use strum::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::id::EntityId;

pub const DEFAULT_BUSINESS_LIMIT: u32 = 50;
pub const DEFAULT_PROMOTION_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// Collections owned by the catalog; `as_ref()` is the collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CatalogCollection {
    Business,
    Promotion,
}

impl CatalogCollection {
    /// Capitalized entity name for messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Promotion => "Promotion",
        }
    }
}

/// Payload for creating a business
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewBusiness {
    /// Business name
    #[validate(length(min = 1))]
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Website URL
    pub website: Option<String>,
    /// Short description of the business
    pub description: Option<String>,
    /// City/Country or address
    pub location: Option<String>,
    /// Industry category, e.g. Retail, Food, Tech
    pub industry: Option<String>,
    /// Whether the business is verified by the platform
    #[serde(default)]
    pub is_verified: bool,
}

impl NewBusiness {
    /// Document to insert, stamped with `now` as both timestamps.
    pub fn into_document(self, now: bson::DateTime) -> Document {
        doc! {
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "website": self.website,
            "description": self.description,
            "location": self.location,
            "industry": self.industry,
            "is_verified": self.is_verified,
            "created_at": now,
            "updated_at": now,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Payload for creating a promotion
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewPromotion {
    /// Related business id (24-char hex)
    #[schema(example = "65f1c0ffee0000000000abcd")]
    pub business_id: String,
    /// Promotion title
    #[validate(length(min = 1))]
    pub title: String,
    /// Promotion details
    pub description: Option<String>,
    /// Banner or product image URL
    pub image_url: Option<String>,
    /// Start date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
    /// Type of discount: percent, amount, bogo, free_shipping, etc.
    pub discount_type: Option<String>,
    /// Numerical discount amount or percent
    #[validate(range(min = 0.0))]
    pub discount_value: Option<f64>,
    /// Terms and conditions
    pub terms: Option<String>,
    /// Searchable tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Whether the promotion is active
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Calendar date as a BSON date-time at midnight UTC.
pub fn date_to_bson(date: NaiveDate) -> Bson {
    let millis = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    Bson::DateTime(bson::DateTime::from_millis(millis))
}

impl NewPromotion {
    /// Document to insert. `business_id` is the parsed reference and is
    /// stored in canonical form regardless of how the client wrote it.
    pub fn into_document(self, business_id: EntityId, now: bson::DateTime) -> Document {
        doc! {
            "business_id": business_id.to_hex(),
            "title": self.title,
            "description": self.description,
            "image_url": self.image_url,
            "start_date": self.start_date.map(date_to_bson),
            "end_date": self.end_date.map(date_to_bson),
            "discount_type": self.discount_type,
            "discount_value": self.discount_value,
            "terms": self.terms,
            "tags": self.tags.unwrap_or_default(),
            "is_active": self.is_active,
            "created_at": now,
            "updated_at": now,
        }
    }
}

/// Query-string boolean: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`,
/// case-insensitive.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_flag(&raw).map(Some).ok_or_else(|| {
            de::Error::custom(format!("invalid boolean '{raw}', expected true or false"))
        }),
    }
}

/// Active-flag criterion for promotion listings.
///
/// Omitted means [`ActiveFilter::Active`]; `any` (or `all`) disables the filter.
/// Any spelling accepted by [`parse_flag`] selects a flag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub enum ActiveFilter {
    #[default]
    #[serde(rename = "true")]
    Active,
    #[serde(rename = "false")]
    Inactive,
    #[serde(rename = "any")]
    Any,
}

impl<'de> Deserialize<'de> for ActiveFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().eq_ignore_ascii_case("any") || raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::Any);
        }
        match parse_flag(&raw) {
            Some(true) => Ok(Self::Active),
            Some(false) => Ok(Self::Inactive),
            None => Err(de::Error::custom(format!(
                "invalid active filter '{raw}', expected true, false or any"
            ))),
        }
    }
}

impl ActiveFilter {
    /// Flag value to match, or `None` for no filter.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Active => Some(true),
            Self::Inactive => Some(false),
            Self::Any => None,
        }
    }
}

fn default_business_limit() -> u32 {
    DEFAULT_BUSINESS_LIMIT
}

fn default_promotion_limit() -> u32 {
    DEFAULT_PROMOTION_LIMIT
}

/// Query parameters for listing businesses
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BusinessFilter {
    /// Case-insensitive substring match on name, description or industry
    pub q: Option<String>,
    /// Maximum number of results; values above 1000 are capped
    #[serde(default = "default_business_limit")]
    #[validate(range(min = 1))]
    #[param(default = 50, minimum = 1)]
    pub limit: u32,
}

impl BusinessFilter {
    /// Row cap sent to the store.
    pub fn effective_limit(&self) -> u32 {
        self.limit.min(MAX_LIMIT)
    }
}

impl Default for BusinessFilter {
    fn default() -> Self {
        Self {
            q: None,
            limit: DEFAULT_BUSINESS_LIMIT,
        }
    }
}

/// Query parameters for listing promotions
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PromotionFilter {
    /// Case-insensitive substring match on title, description or terms
    pub q: Option<String>,
    /// Only promotions carrying this tag
    pub tag: Option<String>,
    /// Only promotions of this business
    pub business_id: Option<String>,
    /// `true` (default), `false`, or `any`/`all` for both
    #[serde(default)]
    #[param(inline)]
    pub active: ActiveFilter,
    /// Maximum number of results; values above 1000 are capped
    #[serde(default = "default_promotion_limit")]
    #[validate(range(min = 1))]
    #[param(default = 100, minimum = 1)]
    pub limit: u32,
}

impl PromotionFilter {
    /// Row cap sent to the store.
    pub fn effective_limit(&self) -> u32 {
        self.limit.min(MAX_LIMIT)
    }
}

impl Default for PromotionFilter {
    fn default() -> Self {
        Self {
            q: None,
            tag: None,
            business_id: None,
            active: ActiveFilter::default(),
            limit: DEFAULT_PROMOTION_LIMIT,
        }
    }
}

/// Fields accepted by the promotion status update
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PromotionStatusUpdate {
    /// New value of the active flag
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    #[param(value_type = Option<bool>)]
    pub is_active: Option<bool>,
}

impl PromotionStatusUpdate {
    /// `$set` fields for the supplied values; empty when nothing was supplied.
    pub fn into_fields(self) -> Document {
        let mut fields = Document::new();
        if let Some(is_active) = self.is_active {
            fields.insert("is_active", is_active);
        }
        fields
    }
}

/// Identifier of a newly created document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "65f1c0ffee0000000000abcd")]
    pub id: String,
}

/// Business as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BusinessRecord {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub is_verified: bool,
    /// RFC 3339 timestamp
    pub created_at: Option<String>,
    /// RFC 3339 timestamp
    pub updated_at: Option<String>,
}

/// Promotion as returned by the API
///
/// `business_name` and `industry` are only present on listings, and only when
/// the referenced business exists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromotionRecord {
    pub id: String,
    pub business_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// RFC 3339 timestamp at midnight UTC
    pub start_date: Option<String>,
    /// RFC 3339 timestamp at midnight UTC
    pub end_date: Option<String>,
    pub discount_type: Option<String>,
    pub discount_value: Option<f64>,
    pub terms: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}
