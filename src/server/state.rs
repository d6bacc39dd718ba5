use axum::extract::FromRef;
use std::sync::Arc;

use crate::composer::Composer;
use crate::storage::MediaStore;

use super::ServerConfig;

pub type SharedComposer = Arc<dyn Composer>;
pub type SharedMediaStore = Arc<dyn MediaStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub composer: SharedComposer,
    pub media_store: SharedMediaStore,
}

impl FromRef<ServerState> for SharedComposer {
    fn from_ref(input: &ServerState) -> Self {
        input.composer.clone()
    }
}

impl FromRef<ServerState> for SharedMediaStore {
    fn from_ref(input: &ServerState) -> Self {
        input.media_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
