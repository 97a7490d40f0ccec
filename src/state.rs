use std::sync::Arc;

use crate::{config::Config, store::Store, utils::jwt::TokenIssuer};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_expiration);
        Self { store, config, tokens }
    }
}

impl FromRef<AppState> for Arc<dyn Store> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
