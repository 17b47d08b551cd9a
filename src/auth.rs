//! Token issuance and the request guards built on it.
//!
//! `require_token` must wrap `require_admin`: the admin check reads the claims
//! the token check leaves in the request extensions.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::AppError, AppState};

/// Decoded token payload. Whatever the client submitted at issuance is kept
/// in `extra`; only `email` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8], lifetime: Duration) -> Self {
        // Payloads are client-chosen; an `aud` in them is not ours to check.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Signs `payload` as the token's claims, valid for the configured lifetime.
    pub fn issue(&self, mut payload: Map<String, Value>) -> Result<String, AppError> {
        let email = match payload.remove("email") {
            None | Some(Value::Null) => None,
            Some(Value::String(email)) => Some(email),
            Some(_) => return Err(AppError::BadRequest("email must be a string".to_string())),
        };
        payload.remove("iat");
        payload.remove("exp");

        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::Internal("token lifetime overflows the clock".to_string()))?;
        let claims = Claims {
            email,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            extra: payload,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects the request with 401 unless it carries a valid bearer token.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("Missing bearer token for {}", request.uri());
        AppError::Unauthorized
    })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Rejects the request with 403 unless the token's email belongs to an admin.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request.extensions().get::<Claims>().ok_or_else(|| {
        AppError::Internal("admin check ran before token verification".to_string())
    })?;

    let email = claims.email.clone().ok_or(AppError::Forbidden)?;
    let user = state.store.find_user_by_email(&email).await?;

    if !user.map(|u| u.is_admin()).unwrap_or(false) {
        tracing::warn!("Forbidden: {} is not an admin", email);
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
