use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    auth::Claims,
    db::Collection,
    error::AppError,
    models::{
        document::Document,
        outcome::{DeleteOutcome, InsertOutcome, UpdateOutcome},
        user::{AdminStatus, MessageResponse},
    },
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    Existing(MessageResponse),
    Created(InsertOutcome),
}

/// Stores the user unless one with the same email is already registered.
pub async fn register(
    State(state): State<AppState>,
    Json(user): Json<Map<String, Value>>,
) -> Result<Json<RegisterResponse>, AppError> {
    let email = user
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest("email is required".to_string()))?;

    if state
        .store
        .find_one_by_email(Collection::Users, email)
        .await?
        .is_some()
    {
        return Ok(Json(RegisterResponse::Existing(MessageResponse {
            message: "user already exist".to_string(),
        })));
    }

    let outcome = state.store.insert_one(Collection::Users, user).await?;
    tracing::info!("Registered user {}", outcome.inserted_id);
    Ok(Json(RegisterResponse::Created(outcome)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(state.store.find_all(Collection::Users).await?))
}

/// Callers may only ask about their own account.
pub async fn admin_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    if claims.email.as_deref() != Some(email.as_str()) {
        return Err(AppError::Forbidden);
    }

    let user = state.store.find_user_by_email(&email).await?;
    Ok(Json(AdminStatus {
        is_admin: user.map(|u| u.is_admin()).unwrap_or(false),
    }))
}

pub async fn promote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let outcome = state.store.promote_to_admin(id).await?;
    tracing::info!(
        "Promoted user {}: matched {}, modified {}",
        id,
        outcome.matched_count,
        outcome.modified_count
    );
    Ok(Json(outcome))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteOutcome>, AppError> {
    Ok(Json(state.store.delete_one(Collection::Users, id).await?))
}
