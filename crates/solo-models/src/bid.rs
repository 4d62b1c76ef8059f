//! Bid documents.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DocId;

/// An offer placed by a bidder on a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Bid {
    /// Storage identifier
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,

    /// Bidder e-mail
    pub email: String,

    /// Referenced job, stored as the job identifier string
    #[serde(rename = "jobId")]
    pub job_id: String,

    /// E-mail of the job owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,

    /// Free-form status (pending, accepted, rejected, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bid {
    /// Create a bid with no optional fields.
    pub fn new(email: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            job_id: job_id.into(),
            buyer: None,
            status: None,
            extra: Map::new(),
        }
    }

    /// True when `other` is a bid by the same bidder on the same job.
    pub fn same_slot(&self, other: &Bid) -> bool {
        self.email == other.email && self.job_id == other.job_id
    }
}

/// Which side of the bid a user is listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidSide {
    /// Bids the user placed
    Bidder,
    /// Bids received on the user's postings
    Buyer,
}

impl BidSide {
    /// Interpret the `buyer` query flag.
    ///
    /// Any non-empty value other than `false`/`0` selects the buyer side.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(v) if !v.is_empty() && v != "false" && v != "0" => BidSide::Buyer,
            _ => BidSide::Bidder,
        }
    }

    /// Whether a bid belongs to `email` on this side.
    pub fn matches(&self, bid: &Bid, email: &str) -> bool {
        match self {
            BidSide::Bidder => bid.email == email,
            BidSide::Buyer => bid.buyer.as_deref() == Some(email),
        }
    }

    /// Document field holding the e-mail for this side.
    pub fn field(&self) -> &'static str {
        match self {
            BidSide::Bidder => "email",
            BidSide::Buyer => "buyer",
        }
    }
}
