use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    IdPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestIdResponse, BadRequestReferenceResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    },
};
use mongodb::bson::Document;
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::{OpenApi, PartialSchema};

use crate::error::CatalogResult;
use crate::id::EntityId;
use crate::models::{
    ActiveFilter, BusinessFilter, BusinessRecord, CreatedResponse, NewBusiness, NewPromotion,
    PromotionFilter, PromotionRecord, PromotionStatusUpdate,
};
use crate::normalize::to_json;
use crate::service::CatalogService;
use crate::store::DocumentStore;

/// OpenAPI documentation for the Catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_business,
        list_businesses,
        get_business,
        create_promotion,
        list_promotions,
        get_promotion,
        update_promotion_status,
        entity_schemas,
    ),
    components(
        schemas(
            NewBusiness,
            NewPromotion,
            BusinessRecord,
            PromotionRecord,
            CreatedResponse,
            ActiveFilter,
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestIdResponse,
            BadRequestReferenceResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Businesses", description = "Business directory"),
        (name = "Promotions", description = "Promotions run by businesses"),
        (name = "Schema", description = "Entity JSON schemas")
    )
)]
pub struct ApiDoc;

/// Create the catalog router with all HTTP endpoints
pub fn router<S: DocumentStore + 'static>(service: CatalogService<S>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/business", get(list_businesses).post(create_business))
        .route("/business/{id}", get(get_business))
        .route("/promotions", get(list_promotions).post(create_promotion))
        .route(
            "/promotions/{id}",
            get(get_promotion).patch(update_promotion_status),
        )
        .route("/schema", get(entity_schemas))
        .with_state(shared_service)
}

fn json_list(documents: Vec<Document>) -> Json<Value> {
    Json(Value::Array(documents.into_iter().map(to_json).collect()))
}

/// Create a business
#[utoipa::path(
    post,
    path = "/business",
    tag = "Businesses",
    request_body = NewBusiness,
    responses(
        (status = 201, description = "Business created", body = CreatedResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_business<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    ValidatedJson(input): ValidatedJson<NewBusiness>,
) -> CatalogResult<impl IntoResponse> {
    let id = service.create_business(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_hex() }),
    ))
}

/// List businesses
#[utoipa::path(
    get,
    path = "/business",
    tag = "Businesses",
    params(BusinessFilter),
    responses(
        (status = 200, description = "Matching businesses", body = Vec<BusinessRecord>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_businesses<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    ValidatedQuery(filter): ValidatedQuery<BusinessFilter>,
) -> CatalogResult<Json<Value>> {
    let businesses = service.list_businesses(filter).await?;
    Ok(json_list(businesses))
}

/// Get a business by id
#[utoipa::path(
    get,
    path = "/business/{id}",
    tag = "Businesses",
    params(
        ("id" = String, Path, description = "Business id (24-char hex)")
    ),
    responses(
        (status = 200, description = "Business found", body = BusinessRecord),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_business<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    IdPath(id): IdPath<EntityId>,
) -> CatalogResult<Json<Value>> {
    let business = service.get_business(id).await?;
    Ok(Json(to_json(business)))
}

/// Create a promotion for an existing business
#[utoipa::path(
    post,
    path = "/promotions",
    tag = "Promotions",
    request_body = NewPromotion,
    responses(
        (status = 201, description = "Promotion created", body = CreatedResponse),
        (status = 400, response = BadRequestReferenceResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_promotion<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    ValidatedJson(input): ValidatedJson<NewPromotion>,
) -> CatalogResult<impl IntoResponse> {
    let id = service.create_promotion(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_hex() }),
    ))
}

/// List promotions with their business name and industry
#[utoipa::path(
    get,
    path = "/promotions",
    tag = "Promotions",
    params(PromotionFilter),
    responses(
        (status = 200, description = "Matching promotions", body = Vec<PromotionRecord>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_promotions<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    ValidatedQuery(filter): ValidatedQuery<PromotionFilter>,
) -> CatalogResult<Json<Value>> {
    let promotions = service.list_promotions(filter).await?;
    Ok(json_list(promotions))
}

/// Get a promotion by id
#[utoipa::path(
    get,
    path = "/promotions/{id}",
    tag = "Promotions",
    params(
        ("id" = String, Path, description = "Promotion id (24-char hex)")
    ),
    responses(
        (status = 200, description = "Promotion found", body = PromotionRecord),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_promotion<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    IdPath(id): IdPath<EntityId>,
) -> CatalogResult<Json<Value>> {
    let promotion = service.get_promotion(id).await?;
    Ok(Json(to_json(promotion)))
}

/// Activate or deactivate a promotion
#[utoipa::path(
    patch,
    path = "/promotions/{id}",
    tag = "Promotions",
    params(
        ("id" = String, Path, description = "Promotion id (24-char hex)"),
        PromotionStatusUpdate
    ),
    responses(
        (status = 200, description = "Updated promotion", body = PromotionRecord),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_promotion_status<S: DocumentStore>(
    State(service): State<Arc<CatalogService<S>>>,
    IdPath(id): IdPath<EntityId>,
    ValidatedQuery(update): ValidatedQuery<PromotionStatusUpdate>,
) -> CatalogResult<Json<Value>> {
    let promotion = service.set_promotion_status(id, update).await?;
    Ok(Json(to_json(promotion)))
}

/// JSON schemas of the business and promotion payloads.
///
/// Also mounted at the service root for tools that read `/schema` directly.
#[utoipa::path(
    get,
    path = "/schema",
    tag = "Schema",
    responses(
        (status = 200, description = "Schemas keyed by entity", body = Value)
    )
)]
pub async fn entity_schemas() -> Json<Value> {
    Json(json!({
        "business": NewBusiness::schema(),
        "promotion": NewPromotion::schema(),
    }))
}
