//! HTTP handlers: three validate-then-insert routes, one bounded list, and
//! the diagnostics route that never fails outward.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use garde::Validate;
use mongodb::bson::{doc, to_document, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    database::StoreStatus,
    error::AppError,
    schemas::{
        validate, Affiliate, CreatedResponse, Message, Order, AFFILIATE_COLLECTION,
        MESSAGE_COLLECTION, ORDER_COLLECTION,
    },
    state::AppState,
};

const DEFAULT_LIST_LIMIT: u32 = 50;

pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Backend OK" }))
}

/// Diagnostics for the deployment dashboard. Every failure mode becomes data
/// in the payload; this route never returns an error status.
pub async fn test_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut database = match state.store.status() {
        StoreStatus::Connected => "✅ Connected".to_string(),
        StoreStatus::Degraded(reason) => format!("❌ Not Available: {reason}"),
    };

    let collections = match state.store.collection_names().await {
        Ok(names) => names,
        Err(error) => {
            database = format!("⚠️ Connected with warning: {error}");
            Vec::new()
        }
    };

    Json(json!({
        "backend": "✅ Running",
        "database": database,
        "database_url": state.config.database_url.is_some(),
        "database_name": state.config.database_name.is_some(),
        "collections": collections,
    }))
}

pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    Json(order): Json<Order>,
) -> Result<Json<CreatedResponse>, AppError> {
    persist(&state, ORDER_COLLECTION, &order).await
}

pub async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Document>>, AppError> {
    let documents = state
        .store
        .list(ORDER_COLLECTION, doc! {}, params.limit)
        .await?;

    Ok(Json(documents))
}

pub async fn create_message_handler(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Message>,
) -> Result<Json<CreatedResponse>, AppError> {
    persist(&state, MESSAGE_COLLECTION, &message).await
}

pub async fn create_affiliate_handler(
    State(state): State<Arc<AppState>>,
    Json(affiliate): Json<Affiliate>,
) -> Result<Json<CreatedResponse>, AppError> {
    persist(&state, AFFILIATE_COLLECTION, &affiliate).await
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

/// Shared validate-then-insert flow behind the three submission routes.
async fn persist<T>(
    state: &AppState,
    collection: &str,
    payload: &T,
) -> Result<Json<CreatedResponse>, AppError>
where
    T: Validate + Serialize,
    T::Context: Default,
{
    validate(payload)?;

    let document = to_document(payload)
        .map_err(|error| AppError::Internal(Box::new(error)))?;

    let id = state.store.create(collection, document).await?;

    Ok(Json(CreatedResponse::new(id)))
}
