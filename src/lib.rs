pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rest;

use auth::TokenKeys;
use db::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: TokenKeys,
}
