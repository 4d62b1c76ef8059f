//! MongoDB repositories for jobs and bids.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Collection, Cursor, IndexModel};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use solo_models::{
    Bid, BidSide, DeleteResult, InsertOneResult, Job, JobFilter, UpdateResult,
};

use crate::client::MongoClient;
use crate::error::{is_duplicate_key, StoreError, StoreResult};
use crate::metrics::observe;
use crate::repository::{BidRepository, JobRepository};
use crate::types::{bid_count_from_bson, doc_id_from_bson, from_document, parse_object_id, to_document};

/// Drain a cursor into model values.
async fn collect<T: DeserializeOwned>(cursor: Cursor<Document>) -> StoreResult<Vec<T>> {
    let docs: Vec<Document> = cursor.try_collect().await?;
    docs.into_iter().map(from_document).collect()
}

fn update_result(result: mongodb::results::UpdateResult) -> UpdateResult {
    let upserted_id = result.upserted_id.as_ref().and_then(doc_id_from_bson);
    UpdateResult {
        acknowledged: true,
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_count: u64::from(upserted_id.is_some()),
        upserted_id,
    }
}

fn insert_result(result: mongodb::results::InsertOneResult) -> StoreResult<InsertOneResult> {
    doc_id_from_bson(&result.inserted_id)
        .map(InsertOneResult::new)
        .ok_or_else(|| StoreError::InvalidDocument(format!("unexpected inserted id {}", result.inserted_id)))
}

/// Build the query and options for a filtered job listing.
///
/// The search text is matched literally; regex metacharacters are escaped.
pub fn job_filter_query(filter: &JobFilter) -> (Document, Option<FindOptions>) {
    let mut query = Document::new();

    if let Some(search) = &filter.search {
        query.insert(
            "title",
            doc! { "$regex": regex::escape(search), "$options": "i" },
        );
    }
    if let Some(category) = &filter.category {
        query.insert("category", category.as_str());
    }

    let options = filter
        .sort
        .map(|order| FindOptions::builder().sort(doc! { "deadline": order.direction() }).build());

    (query, options)
}

// =============================================================================
// Jobs
// =============================================================================

/// Repository for job documents.
pub struct MongoJobRepository {
    collection: Collection<Document>,
}

impl MongoJobRepository {
    /// Create a new job repository.
    pub fn new(client: &MongoClient) -> Self {
        Self {
            collection: client.jobs(),
        }
    }

    /// Create the indexes the listing queries rely on.
    pub async fn setup_collection(&self) -> StoreResult<()> {
        self.collection
            .create_index(
                IndexModel::builder().keys(doc! { "buyer.email": 1 }).build(),
                None,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    async fn list_all(&self) -> StoreResult<Vec<Job>> {
        observe("jobs.list_all", async {
            let cursor = self.collection.find(doc! {}, None).await?;
            collect(cursor).await
        })
        .await
    }

    async fn list_filtered(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        let (query, options) = job_filter_query(filter);
        debug!(?query, "Filtered job listing");

        observe("jobs.list_filtered", async {
            let cursor = self.collection.find(query, options).await?;
            collect(cursor).await
        })
        .await
    }

    async fn list_by_buyer_email(&self, email: &str) -> StoreResult<Vec<Job>> {
        observe("jobs.list_by_buyer", async {
            let cursor = self.collection.find(doc! { "buyer.email": email }, None).await?;
            collect(cursor).await
        })
        .await
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Job>> {
        let oid = parse_object_id(id)?;

        observe("jobs.get", async {
            match self.collection.find_one(doc! { "_id": oid }, None).await? {
                Some(doc) => Ok(Some(from_document(doc)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn create(&self, job: Job) -> StoreResult<InsertOneResult> {
        let doc = to_document(&job)?;

        let result = observe("jobs.create", async {
            let result = self.collection.insert_one(doc, None).await?;
            insert_result(result)
        })
        .await?;

        info!("Created job: {}", result.inserted_id);
        Ok(result)
    }

    async fn upsert(&self, id: &str, job: Job) -> StoreResult<UpdateResult> {
        let oid = parse_object_id(id)?;
        let fields = to_document(&job)?;
        if fields.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let result = observe("jobs.upsert", async {
            let options = UpdateOptions::builder().upsert(true).build();
            let result = self
                .collection
                .update_one(doc! { "_id": oid }, doc! { "$set": fields }, options)
                .await?;
            Ok(update_result(result))
        })
        .await?;

        info!(
            "Upserted job {}: matched={} modified={} upserted={}",
            id, result.matched_count, result.modified_count, result.upserted_count
        );
        Ok(result)
    }

    async fn delete(&self, id: &str) -> StoreResult<DeleteResult> {
        let oid = parse_object_id(id)?;

        let result = observe("jobs.delete", async {
            let result = self.collection.delete_one(doc! { "_id": oid }, None).await?;
            Ok(DeleteResult::new(result.deleted_count))
        })
        .await?;

        info!("Deleted job {}: deleted={}", id, result.deleted_count);
        Ok(result)
    }

    async fn increment_bid_count(&self, id: &str) -> StoreResult<UpdateResult> {
        let oid = parse_object_id(id)?;
        let filter = doc! { "_id": oid };

        observe("jobs.increment_bid_count", async {
            let Some(job) = self.collection.find_one(filter.clone(), None).await? else {
                return Ok(UpdateResult::unmatched());
            };

            // Legacy documents may hold the counter as a string.
            if let Some(stored) = job.get("bid_count") {
                let count = bid_count_from_bson(stored);
                if !count.is_integer() {
                    let normalized = count.normalized();
                    debug!("Normalizing bid_count of job {} to {}", id, normalized);
                    self.collection
                        .update_one(
                            filter.clone(),
                            doc! { "$set": { "bid_count": Bson::Int64(normalized) } },
                            None,
                        )
                        .await?;
                }
            }

            let result = self
                .collection
                .update_one(filter, doc! { "$inc": { "bid_count": 1 } }, None)
                .await?;
            Ok(update_result(result))
        })
        .await
    }
}

// =============================================================================
// Bids
// =============================================================================

/// Repository for bid documents.
pub struct MongoBidRepository {
    collection: Collection<Document>,
}

impl MongoBidRepository {
    /// Create a new bid repository.
    pub fn new(client: &MongoClient) -> Self {
        Self {
            collection: client.bids(),
        }
    }

    /// Create the unique (email, jobId) index that backs the duplicate guard,
    /// plus the buyer-side listing index.
    pub async fn setup_collection(&self) -> StoreResult<()> {
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1, "jobId": 1 })
                    .options(Some(
                        IndexOptions::builder()
                            .unique(Some(true))
                            .name(Some("email_job_unique".to_string()))
                            .build(),
                    ))
                    .build(),
                None,
            )
            .await?;

        self.collection
            .create_index(IndexModel::builder().keys(doc! { "buyer": 1 }).build(), None)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl BidRepository for MongoBidRepository {
    async fn list_for_user(&self, email: &str, side: BidSide) -> StoreResult<Vec<Bid>> {
        let mut query = Document::new();
        query.insert(side.field(), email);

        observe("bids.list_for_user", async {
            let cursor = self.collection.find(query, None).await?;
            collect(cursor).await
        })
        .await
    }

    async fn find_by_bidder_and_job(&self, email: &str, job_id: &str) -> StoreResult<Option<Bid>> {
        observe("bids.find_by_bidder_and_job", async {
            match self
                .collection
                .find_one(doc! { "email": email, "jobId": job_id }, None)
                .await?
            {
                Some(doc) => Ok(Some(from_document(doc)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn insert(&self, bid: Bid) -> StoreResult<InsertOneResult> {
        let doc = to_document(&bid)?;

        observe("bids.insert", async {
            match self.collection.insert_one(doc, None).await {
                Ok(result) => insert_result(result),
                Err(e) if is_duplicate_key(&e) => {
                    Err(StoreError::duplicate_bid(bid.email.as_str(), bid.job_id.as_str()))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn update_status(&self, id: &str, status: &str) -> StoreResult<UpdateResult> {
        let oid = parse_object_id(id)?;

        observe("bids.update_status", async {
            let result = self
                .collection
                .update_one(doc! { "_id": oid }, doc! { "$set": { "status": status } }, None)
                .await?;
            Ok(update_result(result))
        })
        .await
    }
}
