//! Service endpoints outside `/api`: banner, schema, readiness and diagnostics

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::{AppError, HealthCheckFuture, run_health_checks};
use database::mongodb::{check_health_detailed, list_collection_names};
use domain_catalog::handlers::entity_schemas;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

const DIAGNOSTIC_COLLECTION_LIMIT: usize = 10;

#[derive(Serialize)]
struct DiagnosticsResponse {
    database: String,
    collections: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/schema", get(entity_schemas))
        .route("/ready", get(readiness_check))
        .route("/diagnostics", get(diagnostics))
        .with_state(state)
}

async fn banner() -> Json<serde_json::Value> {
    Json(json!({ "message": "Catalog API is running" }))
}

/// Readiness check - verifies the MongoDB connection
async fn readiness_check(State(state): State<AppState>) -> Response {
    let client = state.mongo_client.clone();
    let mongodb: HealthCheckFuture = Box::pin(async move {
        let status = check_health_detailed(&client).await;
        if status.healthy {
            Ok(())
        } else {
            Err(status.message.unwrap_or_default())
        }
    });

    match run_health_checks(vec![("mongodb", mongodb)]).await {
        Ok(ready) => ready.into_response(),
        Err(not_ready) => not_ready.into_response(),
    }
}

/// Database name and the first collection names
async fn diagnostics(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DiagnosticsResponse>), AppError> {
    let collections = list_collection_names(&state.db, DIAGNOSTIC_COLLECTION_LIMIT)
        .await
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            database: state.db.name().to_string(),
            collections,
        }),
    ))
}
