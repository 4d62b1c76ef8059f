//! In-memory repositories.
//!
//! Process-local implementations with the same observable behaviour as the
//! MongoDB repositories: ObjectId-format identifiers, insertion order as the
//! natural order, `$set` merge on upsert, idempotent delete. Used by tests and
//! by `STORE_BACKEND=memory` for local development.

use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use solo_models::{
    Bid, BidSide, DeleteResult, InsertOneResult, Job, JobFilter, SortOrder, UpdateResult,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::{BidRepository, JobRepository};
use crate::types::{new_doc_id, parse_object_id};

/// Canonical (lowercase hex) form of a caller-supplied identifier.
fn canonical_id(id: &str) -> StoreResult<String> {
    Ok(parse_object_id(id)?.to_hex())
}

fn has_id(id: &Option<solo_models::DocId>, wanted: &str) -> bool {
    id.as_ref().map(|d| d.as_str() == wanted).unwrap_or(false)
}

/// Deadline order; jobs without a string deadline sort first ascending, last descending.
fn compare_deadlines(a: &Job, b: &Job, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.deadline_str().cmp(&b.deadline_str()),
        SortOrder::Desc => b.deadline_str().cmp(&a.deadline_str()),
    }
}

// =============================================================================
// Jobs
// =============================================================================

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<Vec<Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn list_all(&self) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.read().await.clone())
    }

    async fn list_filtered(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .iter()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();

        if let Some(order) = filter.sort {
            jobs.sort_by(|a, b| compare_deadlines(a, b, order));
        }

        Ok(jobs)
    }

    async fn list_by_buyer_email(&self, email: &str) -> StoreResult<Vec<Job>> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .filter(|job| job.buyer_email() == Some(email))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Job>> {
        let id = canonical_id(id)?;
        Ok(self.jobs.read().await.iter().find(|job| has_id(&job.id, &id)).cloned())
    }

    async fn create(&self, mut job: Job) -> StoreResult<InsertOneResult> {
        let id = new_doc_id();
        job.id = Some(id.clone());
        self.jobs.write().await.push(job);

        info!("Created job: {}", id);
        Ok(InsertOneResult::new(id))
    }

    async fn upsert(&self, id: &str, mut job: Job) -> StoreResult<UpdateResult> {
        let id = canonical_id(id)?;
        job.id = None;
        if job.has_no_fields() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut jobs = self.jobs.write().await;
        if let Some(existing) = jobs.iter_mut().find(|j| has_id(&j.id, &id)) {
            let before = existing.clone();
            existing.merge_from(job);
            return Ok(UpdateResult::matched(*existing != before));
        }

        job.id = Some(id.as_str().into());
        jobs.push(job);
        Ok(UpdateResult::upserted(id.into()))
    }

    async fn delete(&self, id: &str) -> StoreResult<DeleteResult> {
        let id = canonical_id(id)?;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|job| !has_id(&job.id, &id));
        Ok(DeleteResult::new((before - jobs.len()) as u64))
    }

    async fn increment_bid_count(&self, id: &str) -> StoreResult<UpdateResult> {
        let id = canonical_id(id)?;
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|j| has_id(&j.id, &id)) {
            Some(job) => {
                job.increment_bid_count();
                Ok(UpdateResult::matched(true))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }
}

// =============================================================================
// Bids
// =============================================================================

#[derive(Default)]
pub struct InMemoryBidRepository {
    bids: RwLock<Vec<Bid>>,
}

impl InMemoryBidRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BidRepository for InMemoryBidRepository {
    async fn list_for_user(&self, email: &str, side: BidSide) -> StoreResult<Vec<Bid>> {
        Ok(self
            .bids
            .read()
            .await
            .iter()
            .filter(|bid| side.matches(bid, email))
            .cloned()
            .collect())
    }

    async fn find_by_bidder_and_job(&self, email: &str, job_id: &str) -> StoreResult<Option<Bid>> {
        Ok(self
            .bids
            .read()
            .await
            .iter()
            .find(|bid| bid.email == email && bid.job_id == job_id)
            .cloned())
    }

    async fn insert(&self, mut bid: Bid) -> StoreResult<InsertOneResult> {
        // Check and insert under one lock, like a unique index.
        let mut bids = self.bids.write().await;
        if bids.iter().any(|existing| existing.same_slot(&bid)) {
            return Err(StoreError::duplicate_bid(bid.email, bid.job_id));
        }

        let id = new_doc_id();
        bid.id = Some(id.clone());
        bids.push(bid);
        Ok(InsertOneResult::new(id))
    }

    async fn update_status(&self, id: &str, status: &str) -> StoreResult<UpdateResult> {
        let id = canonical_id(id)?;
        let mut bids = self.bids.write().await;
        match bids.iter_mut().find(|b| has_id(&b.id, &id)) {
            Some(bid) => {
                let modified = bid.status.as_deref() != Some(status);
                bid.status = Some(status.to_string());
                Ok(UpdateResult::matched(modified))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }
}
