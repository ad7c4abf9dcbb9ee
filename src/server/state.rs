use axum::extract::FromRef;

use crate::trivia_store::TriviaStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedTriviaStore = Arc<dyn TriviaStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedTriviaStore,
}

impl FromRef<ServerState> for GuardedTriviaStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
