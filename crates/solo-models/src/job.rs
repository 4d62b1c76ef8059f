//! Job posting documents.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DocId;

/// Embedded owner of a job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Buyer {
    /// Owner e-mail, used for buyer-side queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Any other buyer fields (name, photo, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored bid counter.
///
/// Older documents may carry the counter as a string or some other
/// non-integer value; those are coerced before the first increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum BidCount {
    Count(i64),
    Other(Value),
}

impl BidCount {
    /// True when the stored value can be incremented as-is.
    pub fn is_integer(&self) -> bool {
        matches!(self, BidCount::Count(_))
    }

    /// Integer value of the counter.
    ///
    /// Strings use their leading integer (`"12 bids"` is 12), floats are
    /// truncated, anything unparseable is 0. Negative values clamp to 0.
    pub fn normalized(&self) -> i64 {
        let n = match self {
            BidCount::Count(n) => *n,
            BidCount::Other(Value::String(s)) => parse_leading_int(s).unwrap_or(0),
            BidCount::Other(Value::Number(n)) => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
                .unwrap_or(0),
            BidCount::Other(_) => 0,
        };
        n.max(0)
    }
}

impl Default for BidCount {
    fn default() -> Self {
        BidCount::Count(0)
    }
}

/// Parse an optional sign followed by leading decimal digits, ignoring
/// leading whitespace and any trailing characters.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    // Saturate absurdly long digit runs instead of failing.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// A posted job.
///
/// Known fields are typed; everything else the client sends is kept in
/// `extra` and stored verbatim. `title`, `category` and `deadline` are kept
/// as whatever JSON value was stored; filtering and sorting only look at
/// their string form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Storage identifier
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,

    /// Usually an ISO-8601 date string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,

    /// Absent until the first accepted bid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_count: Option<BidCount>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn title_str(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }

    pub fn category_str(&self) -> Option<&str> {
        self.category.as_ref().and_then(Value::as_str)
    }

    /// Deadline when stored as a string; other representations sort as missing.
    pub fn deadline_str(&self) -> Option<&str> {
        self.deadline.as_ref().and_then(Value::as_str)
    }

    /// E-mail of the posting buyer, if any.
    pub fn buyer_email(&self) -> Option<&str> {
        self.buyer.as_ref().and_then(|b| b.email.as_deref())
    }

    /// True when no field would be written by a `$set` of this job.
    pub fn has_no_fields(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.deadline.is_none()
            && self.buyer.is_none()
            && self.bid_count.is_none()
            && self.extra.is_empty()
    }

    /// Overwrite every field present in `update`, keeping the rest.
    ///
    /// The identifier is never touched.
    pub fn merge_from(&mut self, update: Job) {
        if update.title.is_some() {
            self.title = update.title;
        }
        if update.category.is_some() {
            self.category = update.category;
        }
        if update.deadline.is_some() {
            self.deadline = update.deadline;
        }
        if update.buyer.is_some() {
            self.buyer = update.buyer;
        }
        if update.bid_count.is_some() {
            self.bid_count = update.bid_count;
        }
        self.extra.extend(update.extra);
    }

    /// Coerce the counter to an integer and add one, saturating at `i64::MAX`.
    pub fn increment_bid_count(&mut self) -> i64 {
        let next = self
            .bid_count
            .as_ref()
            .map(BidCount::normalized)
            .unwrap_or(0)
            .saturating_add(1);
        self.bid_count = Some(BidCount::Count(next));
        next
    }
}

/// Deadline ordering for filtered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `asc` sorts ascending; any other value sorts descending.
    pub fn parse(s: &str) -> Self {
        if s == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    /// MongoDB sort direction.
    pub fn direction(&self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Criteria for the filtered job listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Deadline ordering
    pub sort: Option<SortOrder>,
}

impl JobFilter {
    /// Build from raw query values, treating empty strings as absent.
    pub fn from_query(
        category: Option<String>,
        search: Option<String>,
        sort: Option<String>,
    ) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            category: non_empty(category),
            search: non_empty(search),
            sort: non_empty(sort).map(|s| SortOrder::parse(&s)),
        }
    }

    /// Evaluate the filter against a job.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(category) = &self.category {
            if job.category_str() != Some(category.as_str()) {
                return false;
            }
        }

        match &self.search {
            Some(search) => job
                .title_str()
                .map(|t| t.to_lowercase().contains(&search.to_lowercase()))
                .unwrap_or(false),
            None => true,
        }
    }
}
