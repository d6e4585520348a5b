pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod http;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod security;
pub mod services;
pub mod validators;


use std::sync::Arc;

use crate::config::Config;
use crate::db::UserStore;
use crate::security::{TokenBlacklist, TokenCodec};
use crate::services::AuthSessionService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub codec: Arc<TokenCodec>,
    pub blacklist: TokenBlacklist,
    pub auth: Arc<AuthSessionService>,
    pub config: Arc<Config>,
}
