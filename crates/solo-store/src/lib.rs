//! Job and bid storage.
//!
//! This crate provides:
//! - Repository traits for jobs and bids
//! - MongoDB repositories over the official driver
//! - In-memory repositories with the same behaviour
//! - Connection configuration and a startup health check
//! - Storage metrics

pub mod client;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod repos;
pub mod repository;
pub mod store;
pub mod types;

pub use client::{Backend, MongoClient, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryBidRepository, InMemoryJobRepository};
pub use repos::{MongoBidRepository, MongoJobRepository};
pub use repository::{BidRepository, JobRepository};
pub use store::Store;
