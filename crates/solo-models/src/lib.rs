//! Shared data models for the SoloSphere marketplace backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and their bid counters
//! - Bids and the bidder/buyer listing side
//! - Listing filters
//! - Write results passed through to API callers

pub mod bid;
pub mod id;
pub mod job;
pub mod results;

// Re-export common types
pub use bid::{Bid, BidSide};
pub use id::DocId;
pub use job::{BidCount, Buyer, Job, JobFilter, SortOrder};
pub use results::{DeleteResult, InsertOneResult, UpdateResult};
