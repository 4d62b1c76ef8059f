//! Application state.

use std::sync::Arc;

use solo_store::Store;

use crate::auth::TokenService;
use crate::config::ApiConfig;
use crate::services::BidService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Store,
    pub tokens: Arc<TokenService>,
    pub bid_service: BidService,
}

impl AppState {
    /// Create application state around an already connected store.
    pub fn new(config: ApiConfig, store: Store) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config));
        let bid_service = BidService::new(&store);

        Self {
            config,
            store,
            tokens,
            bid_service,
        }
    }
}
