//! Repository interfaces for jobs and bids.

use async_trait::async_trait;

use solo_models::{Bid, BidSide, DeleteResult, InsertOneResult, Job, JobFilter, UpdateResult};

use crate::error::StoreResult;

/// Job posting storage.
///
/// Every operation is a single round-trip; nothing spans documents.
/// Identifiers are hex strings and malformed ones fail with
/// [`StoreError::InvalidId`](crate::StoreError::InvalidId) before storage is touched.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Every job, unfiltered.
    async fn list_all(&self) -> StoreResult<Vec<Job>>;

    /// Jobs matching a category / title filter, optionally ordered by deadline.
    async fn list_filtered(&self, filter: &JobFilter) -> StoreResult<Vec<Job>>;

    /// Jobs whose embedded buyer e-mail equals `email`.
    async fn list_by_buyer_email(&self, email: &str) -> StoreResult<Vec<Job>>;

    /// A single job, or `None`.
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Job>>;

    /// Insert a job; storage assigns the identifier.
    async fn create(&self, job: Job) -> StoreResult<InsertOneResult>;

    /// `$set` the supplied fields at `id`, creating the job there if missing.
    async fn upsert(&self, id: &str, job: Job) -> StoreResult<UpdateResult>;

    /// Remove a job. Deleting a missing job reports zero, not an error.
    async fn delete(&self, id: &str) -> StoreResult<DeleteResult>;

    /// Coerce a non-integer `bid_count` and add one.
    ///
    /// A missing job matches nothing and is not an error.
    async fn increment_bid_count(&self, id: &str) -> StoreResult<UpdateResult>;
}

/// Bid storage.
#[async_trait]
pub trait BidRepository: Send + Sync {
    /// Bids for a user, as bidder or as job owner.
    async fn list_for_user(&self, email: &str, side: BidSide) -> StoreResult<Vec<Bid>>;

    /// The bid `email` placed on `job_id`, if any.
    async fn find_by_bidder_and_job(&self, email: &str, job_id: &str) -> StoreResult<Option<Bid>>;

    /// Insert a bid.
    ///
    /// Fails with [`StoreError::DuplicateBid`](crate::StoreError::DuplicateBid)
    /// when the bidder already has a bid on the job.
    async fn insert(&self, bid: Bid) -> StoreResult<InsertOneResult>;

    /// Set a bid's status. Any string is accepted.
    async fn update_status(&self, id: &str, status: &str) -> StoreResult<UpdateResult>;
}
