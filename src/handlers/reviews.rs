use axum::{extract::State, Json};

use crate::{db::Collection, error::AppError, models::document::Document, AppState};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.store.find_all(Collection::Reviews).await?))
}
