//! Bid handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use solo_models::{Bid, BidSide, InsertOneResult, UpdateResult};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BidListQuery {
    /// Truthy to list bids received as a buyer
    #[serde(default)]
    pub buyer: Option<String>,
}

/// List a user's bids, as bidder or as buyer.
///
/// The session token must belong to `email`.
pub async fn list_user_bids(
    State(state): State<AppState>,
    user: AuthUser,
    Path(email): Path<String>,
    Query(query): Query<BidListQuery>,
) -> ApiResult<Json<Vec<Bid>>> {
    user.ensure_email(&email)?;

    let side = BidSide::from_flag(query.buyer.as_deref());
    Ok(Json(state.store.bids.list_for_user(&email, side).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidStatusUpdate {
    pub current_status: String,
}

/// Set a bid's status.
pub async fn update_bid_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<BidStatusUpdate>,
) -> ApiResult<Json<UpdateResult>> {
    let result = state
        .store
        .bids
        .update_status(&id, &update.current_status)
        .await?;

    info!(bid_id = %id, status = %update.current_status, "Bid status updated");
    Ok(Json(result))
}

pub async fn place_bid(
    State(state): State<AppState>,
    Json(bid): Json<Bid>,
) -> ApiResult<Json<InsertOneResult>> {
    Ok(Json(state.bid_service.place_bid(bid).await?))
}
