use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::TokenAuthenticator;
use crate::config::Config;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub config: Config,
    pub auth: TokenAuthenticator,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let auth = TokenAuthenticator::new(config.admin_token.as_deref());
        Self {
            workspace: None,
            db: None,
            config,
            auth,
        }
    }
}
