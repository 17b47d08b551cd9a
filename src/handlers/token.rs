use axum::{extract::State, Json};
use serde_json::{Map, Value};

use crate::{error::AppError, models::user::AuthResponse, AppState};

pub async fn issue(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = state.tokens.issue(payload)?;
    Ok(Json(AuthResponse { token }))
}
