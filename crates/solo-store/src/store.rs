//! Storage facade handed to the API layer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::client::{Backend, MongoClient, StoreConfig};
use crate::error::StoreResult;
use crate::memory::{InMemoryBidRepository, InMemoryJobRepository};
use crate::repos::{MongoBidRepository, MongoJobRepository};
use crate::repository::{BidRepository, JobRepository};

/// Job and bid repositories sharing one backend.
#[derive(Clone)]
pub struct Store {
    pub jobs: Arc<dyn JobRepository>,
    pub bids: Arc<dyn BidRepository>,
    mongo: Option<MongoClient>,
}

impl Store {
    /// Connect to the configured backend.
    ///
    /// For MongoDB this pings the deployment and fails if it is unreachable,
    /// so callers can refuse to start instead of serving without a database.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend {
            Backend::Memory => {
                warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
            Backend::MongoDb => {
                let client = MongoClient::connect(config).await?;
                client.ping().await?;

                let jobs = MongoJobRepository::new(&client);
                let bids = MongoBidRepository::new(&client);

                if let Err(e) = jobs.setup_collection().await {
                    warn!("Failed to create job indexes: {}", e);
                }
                // Without this index the duplicate-bid guard is only the
                // pre-insert check, which concurrent requests can both pass.
                if let Err(e) = bids.setup_collection().await {
                    warn!("Failed to create bid indexes, duplicate bids are not race-safe: {}", e);
                }

                info!("Connected to MongoDB database {}", config.database);

                Ok(Self {
                    jobs: Arc::new(jobs),
                    bids: Arc::new(bids),
                    mongo: Some(client),
                })
            }
        }
    }

    /// Store backed by process memory.
    pub fn in_memory() -> Self {
        Self {
            jobs: Arc::new(InMemoryJobRepository::new()),
            bids: Arc::new(InMemoryBidRepository::new()),
            mongo: None,
        }
    }

    /// Name of the active backend.
    pub fn backend(&self) -> Backend {
        if self.mongo.is_some() {
            Backend::MongoDb
        } else {
            Backend::Memory
        }
    }

    /// Check database connectivity; always succeeds in memory.
    pub async fn ping(&self) -> StoreResult<Duration> {
        match &self.mongo {
            Some(client) => client.ping().await,
            None => Ok(Duration::ZERO),
        }
    }
}
