use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    db::Collection,
    error::AppError,
    models::{
        document::Document,
        outcome::{DeleteOutcome, InsertOutcome},
        user::EmailFilter,
    },
    AppState,
};

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<EmailFilter>,
) -> Result<Json<Vec<Document>>, AppError> {
    let carts = match filter.email.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => state.store.find_by_email(Collection::Carts, email).await?,
        None => state.store.find_all(Collection::Carts).await?,
    };
    Ok(Json(carts))
}

pub async fn create(
    State(state): State<AppState>,
    Json(item): Json<Map<String, Value>>,
) -> Result<Json<InsertOutcome>, AppError> {
    tracing::debug!("Adding cart item: {:?}", item);
    Ok(Json(state.store.insert_one(Collection::Carts, item).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteOutcome>, AppError> {
    Ok(Json(state.store.delete_one(Collection::Carts, id).await?))
}
