use serde::{Deserialize, Serialize};

use super::document::Document;

pub const ADMIN_ROLE: &str = "admin";

/// The slice of a user document the authorizer cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

impl From<&Document> for User {
    fn from(doc: &Document) -> Self {
        Self {
            role: doc.get_str("role").map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatus {
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailFilter {
    pub email: Option<String>,
}
