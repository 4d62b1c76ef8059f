//! Business logic services.

pub mod bid;

pub use bid::BidService;
