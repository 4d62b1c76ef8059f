//! Bid placement.

use std::sync::Arc;

use tracing::{error, info, warn};

use solo_models::{Bid, InsertOneResult};
use solo_store::{BidRepository, JobRepository, Store, StoreError};

use crate::error::{ApiError, ApiResult, DUPLICATE_BID_MESSAGE};
use crate::metrics;

/// Places bids and keeps job bid counters in step.
#[derive(Clone)]
pub struct BidService {
    jobs: Arc<dyn JobRepository>,
    bids: Arc<dyn BidRepository>,
}

impl BidService {
    pub fn new(store: &Store) -> Self {
        Self {
            jobs: Arc::clone(&store.jobs),
            bids: Arc::clone(&store.bids),
        }
    }

    /// Record a bid and bump the job's `bid_count`.
    ///
    /// A bidder gets one bid per job. The referenced job need not exist; the
    /// counter update is then skipped. Once the bid is stored a failed counter
    /// update is logged and the bid is still reported as placed, so a retry
    /// does not meet a 409 for a bid the client never saw succeed.
    pub async fn place_bid(&self, bid: Bid) -> ApiResult<InsertOneResult> {
        if self
            .bids
            .find_by_bidder_and_job(&bid.email, &bid.job_id)
            .await?
            .is_some()
        {
            return Err(self.reject_duplicate(&bid));
        }

        let email = bid.email.clone();
        let job_id = bid.job_id.clone();

        let result = match self.bids.insert(bid).await {
            Ok(result) => result,
            Err(StoreError::DuplicateBid { .. }) => {
                warn!(email = %email, job_id = %job_id, "Duplicate bid lost insert race");
                metrics::record_duplicate_bid();
                return Err(ApiError::Conflict(DUPLICATE_BID_MESSAGE.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        match self.jobs.increment_bid_count(&job_id).await {
            Ok(update) if update.matched_count == 0 => {
                info!(job_id = %job_id, "Bid references unknown job; bid_count unchanged");
            }
            Ok(_) => {}
            Err(StoreError::InvalidId(_)) => {
                warn!(job_id = %job_id, "Bid references malformed job id; bid_count unchanged");
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Bid stored but bid_count update failed");
            }
        }

        metrics::record_bid_placed();
        info!(email = %email, job_id = %job_id, bid_id = %result.inserted_id, "Bid placed");

        Ok(result)
    }

    fn reject_duplicate(&self, bid: &Bid) -> ApiError {
        warn!(email = %bid.email, job_id = %bid.job_id, "Rejected duplicate bid");
        metrics::record_duplicate_bid();
        ApiError::Conflict(DUPLICATE_BID_MESSAGE.to_string())
    }
}
