use axum::{
    extract::{Path, State},
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
    },
    AppState,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.store.find_all(Collection::Menu).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(item): Json<Map<String, Value>>,
) -> Result<Json<InsertOutcome>, AppError> {
    let outcome = state.store.insert_one(Collection::Menu, item).await?;
    tracing::info!("Menu item {} created", outcome.inserted_id);
    Ok(Json(outcome))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteOutcome>, AppError> {
    Ok(Json(state.store.delete_one(Collection::Menu, id).await?))
}
