//! Handler tests for the Catalog domain
//!
//! Drive the catalog router over the in-memory store:
//! - request deserialization and validation
//! - status codes and error bodies
//! - normalized JSON output and promotion enrichment
//!
//! The router is nested under `/api` the way the application mounts it.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_catalog::{
    CatalogCollection, CatalogService, DocumentStore, MemoryDocumentStore, handlers,
};
use http_body_util::BodyExt;
use mongodb::bson::{DateTime, doc};
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use test_utils::assertions::{assert_object_id, assert_some};
use tower::ServiceExt; // For oneshot()

fn app(store: MemoryDocumentStore) -> Router {
    Router::new().nest("/api", handlers::router(CatalogService::new(store)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

async fn patch(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::patch(uri).body(Body::empty()).unwrap()).await
}

fn titles(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_and_get_business() {
    let app = app(MemoryDocumentStore::new());

    let (status, created) = post(
        &app,
        "/api/business",
        json!({ "name": "Acme", "industry": "Retail", "email": "hi@acme.test" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();
    assert_object_id(id, "created business id");

    let (status, business) = get(&app, &format!("/api/business/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(business["id"], id);
    assert_eq!(business["name"], "Acme");
    assert_eq!(business["industry"], "Retail");
    assert_eq!(business["is_verified"], false);
    assert_eq!(business["website"], Value::Null);
    assert!(business.get("_id").is_none());
    assert!(business["created_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_invalid_business_writes_nothing() {
    let app = app(MemoryDocumentStore::new());

    let (status, body) = post(&app, "/api/business", json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["name"].is_array());

    let (status, body) = post(&app, "/api/business", json!({ "industry": "Retail" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "JSON_EXTRACTION");
    assert!(body["message"].as_str().unwrap().contains("name"));

    let (status, body) = get(&app, "/api/business").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_get_business_rejects_bad_and_unknown_ids() {
    let app = app(MemoryDocumentStore::new());
    let builder = TestDataBuilder::from_test_name("test_get_business_rejects_bad_and_unknown_ids");

    let (status, body) = get(&app, "/api/business/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ID");
    assert_eq!(body["message"], "Invalid id format: 'not-an-id'");

    let (status, body) = get(&app, &format!("/api/business/{}", builder.object_id())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
    assert_eq!(body["message"], "Business not found");
}

#[tokio::test]
async fn test_list_businesses_search_and_limit() {
    let app = app(MemoryDocumentStore::new());
    for (name, industry) in [
        ("Corner Cafe", "Food"),
        ("Byte Shop", "Tech"),
        ("Bean There", "Food"),
    ] {
        let (status, _) = post(
            &app,
            "/api/business",
            json!({ "name": name, "industry": industry }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get(&app, "/api/business?q=FOOD").await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Corner Cafe", "Bean There"]);

    let (_, body) = get(&app, "/api/business?limit=1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get(&app, "/api/business?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = get(&app, "/api/business?limit=5000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = get(&app, "/api/business?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_create_promotion_requires_existing_business() {
    let app = app(MemoryDocumentStore::new());
    let builder =
        TestDataBuilder::from_test_name("test_create_promotion_requires_existing_business");

    let (status, body) = post(
        &app,
        "/api/promotions",
        json!({ "business_id": builder.object_id(), "title": "Sale" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REFERENCE");

    let (status, body) = post(
        &app,
        "/api/promotions",
        json!({ "business_id": "nope", "title": "Sale" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ID");

    let (_, body) = get(&app, "/api/promotions?active=any").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_promotion_and_read_back() {
    let app = app(MemoryDocumentStore::new());

    let (_, business) = post(&app, "/api/business", json!({ "name": "Acme" })).await;
    let business_id = business["id"].as_str().unwrap().to_string();

    let (status, created) = post(
        &app,
        "/api/promotions",
        json!({
            "business_id": business_id.to_uppercase(),
            "title": "Spring Sale",
            "start_date": "2024-05-01",
            "discount_type": "percent",
            "discount_value": 15.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, promotion) = get(&app, &format!("/api/promotions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promotion["id"], id);
    assert_eq!(promotion["business_id"], business_id.as_str());
    assert_eq!(promotion["start_date"], "2024-05-01T00:00:00Z");
    assert_eq!(promotion["end_date"], Value::Null);
    assert_eq!(promotion["discount_value"], 15.0);
    assert_eq!(promotion["tags"], json!([]));
    assert_eq!(promotion["is_active"], true);
    assert!(promotion.get("business_name").is_none());
}

#[tokio::test]
async fn test_negative_discount_is_rejected() {
    let app = app(MemoryDocumentStore::new());
    let (_, business) = post(&app, "/api/business", json!({ "name": "Acme" })).await;

    let (status, body) = post(
        &app,
        "/api/promotions",
        json!({
            "business_id": business["id"],
            "title": "Bad",
            "discount_value": -5
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["discount_value"].is_array());
}

async fn seeded_store() -> (MemoryDocumentStore, String) {
    let store = MemoryDocumentStore::new();
    let business_id = store
        .insert(
            CatalogCollection::Business,
            doc! { "name": "Acme", "industry": "Retail", "email": "hi@acme.test" },
        )
        .await
        .unwrap()
        .to_hex();

    for promotion in [
        doc! { "business_id": business_id.as_str(), "title": "Sale", "tags": ["summer"], "is_active": true, "created_at": DateTime::now() },
        doc! { "business_id": business_id.as_str(), "title": "Old deal", "tags": [], "is_active": false },
        doc! { "business_id": "65f1c0ffee0000000000dead", "title": "Ghost", "tags": ["summer"], "is_active": true },
    ] {
        store
            .insert(CatalogCollection::Promotion, promotion)
            .await
            .unwrap();
    }

    (store, business_id)
}

#[tokio::test]
async fn test_list_promotions_enriches_known_businesses() {
    let (store, business_id) = seeded_store().await;
    let app = app(store);

    let (status, body) = get(&app, "/api/promotions").await;
    assert_eq!(status, StatusCode::OK);

    let promotions = body.as_array().unwrap();
    assert_eq!(titles(&body), vec!["Sale", "Ghost"]);

    let sale = &promotions[0];
    assert_eq!(sale["business_id"], business_id.as_str());
    assert_eq!(sale["business_name"], "Acme");
    assert_eq!(sale["industry"], "Retail");
    assert!(sale.get("email").is_none());
    assert!(sale["created_at"].is_string());

    let ghost = &promotions[1];
    assert!(ghost.get("business_name").is_none());
    assert!(ghost.get("industry").is_none());
}

#[tokio::test]
async fn test_list_promotions_active_filter() {
    let (store, business_id) = seeded_store().await;
    let app = app(store);

    let (_, body) = get(&app, "/api/promotions?active=any").await;
    assert_eq!(titles(&body), vec!["Sale", "Old deal", "Ghost"]);

    let (_, body) = get(&app, "/api/promotions?active=all").await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = get(&app, "/api/promotions?active=false").await;
    assert_eq!(titles(&body), vec!["Old deal"]);

    let (_, body) = get(&app, "/api/promotions?tag=summer").await;
    assert_eq!(titles(&body), vec!["Sale", "Ghost"]);

    let (_, body) = get(
        &app,
        &format!("/api/promotions?business_id={business_id}&active=any"),
    )
    .await;
    assert_eq!(titles(&body), vec!["Sale", "Old deal"]);

    let (_, body) = get(&app, "/api/promotions?q=deal&tag=&active=any").await;
    assert_eq!(titles(&body), vec!["Old deal"]);

    let (_, body) = get(&app, "/api/promotions?active=True").await;
    assert_eq!(titles(&body), vec!["Sale", "Ghost"]);

    let (_, body) = get(&app, "/api/promotions?active=0").await;
    assert_eq!(titles(&body), vec!["Old deal"]);

    let (_, body) = get(&app, "/api/promotions?active=ANY").await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = get(&app, "/api/promotions?active=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_update_promotion_status() {
    let app = app(MemoryDocumentStore::new());
    let (_, business) = post(&app, "/api/business", json!({ "name": "Acme" })).await;
    let (_, created) = post(
        &app,
        "/api/promotions",
        json!({ "business_id": business["id"], "title": "Sale" }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = patch(&app, &format!("/api/promotions/{id}?is_active=false")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["is_active"], false);
    assert!(updated["updated_at"].is_string());

    let (_, body) = get(&app, "/api/promotions").await;
    assert_eq!(body, json!([]));

    let (status, updated) = patch(&app, &format!("/api/promotions/{id}?is_active=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], true);

    let (status, updated) = patch(&app, &format!("/api/promotions/{id}?is_active=False")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], false);

    let (status, updated) = patch(&app, &format!("/api/promotions/{id}?is_active=True")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], true);

    let (status, body) = patch(&app, &format!("/api/promotions/{id}?is_active=maybe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_QUERY");

    let (status, body) = patch(&app, &format!("/api/promotions/{id}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "No fields to update");
}

#[tokio::test]
async fn test_update_unknown_promotion_is_not_found() {
    let app = app(MemoryDocumentStore::new());
    let builder = TestDataBuilder::from_test_name("test_update_unknown_promotion_is_not_found");

    let (status, body) = patch(
        &app,
        &format!("/api/promotions/{}?is_active=true", builder.object_id()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Promotion not found");

    let (status, body) = patch(&app, "/api/promotions/xyz?is_active=true").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ID");
}

#[tokio::test]
async fn test_schema_describes_both_entities() {
    let app = app(MemoryDocumentStore::new());

    let (status, body) = get(&app, "/api/schema").await;
    assert_eq!(status, StatusCode::OK);

    let business = assert_some(body.get("business"), "business schema");
    let promotion = assert_some(body.get("promotion"), "promotion schema");
    assert!(business["properties"].get("name").is_some());
    assert!(promotion["properties"].get("business_id").is_some());
    assert!(
        promotion["required"]
            .as_array()
            .unwrap()
            .contains(&json!("title"))
    );
}
