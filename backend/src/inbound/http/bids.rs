//! Bid ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/commissions/{id}/bids {"amount":6000,"estimatedDays":14}
//! GET  /api/v1/commissions/{id}/bids
//! POST /api/v1/bids/{id}/accept
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AcceptBidResponse, SubmitBidRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::commissions::commission_id;
use crate::inbound::http::marketplace_dto::{BidResponse, CommissionResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

/// Offer terms. The amount is in cents.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBidBody {
    #[schema(example = 6000)]
    pub amount: Option<i64>,
    #[schema(example = 14)]
    pub estimated_days: Option<i64>,
    pub message: Option<String>,
}

/// The winning bid and its now assigned commission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptBidResult {
    pub commission: CommissionResponse,
    pub bid: BidResponse,
}

impl From<AcceptBidResponse> for AcceptBidResult {
    fn from(value: AcceptBidResponse) -> Self {
        Self {
            commission: value.commission.into(),
            bid: value.bid.into(),
        }
    }
}

fn parse_offer(body: SubmitBidBody) -> ApiResult<SubmitBidRequest> {
    Ok(SubmitBidRequest {
        amount: require(body.amount, FieldName::new("amount"))?,
        estimated_days: body.estimated_days,
        message: body.message,
    })
}

/// Place a bid on an open commission as the signed-in artist.
#[utoipa::path(
    post,
    path = "/api/v1/commissions/{id}/bids",
    params(("id" = String, Path, description = "Commission id")),
    request_body = SubmitBidBody,
    responses(
        (status = 201, description = "Bid placed", body = BidResponse),
        (status = 400, description = "Invalid offer", body = ErrorSchema),
        (status = 403, description = "Only artists bid", body = ErrorSchema),
        (status = 404, description = "Commission not found", body = ErrorSchema),
        (status = 409, description = "Not open, or an active bid exists", body = ErrorSchema)
    ),
    tags = ["bids"],
    operation_id = "submitBid"
)]
#[post("/commissions/{id}/bids")]
pub async fn submit_bid(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SubmitBidBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let id = commission_id(&path)?;
    let offer = parse_offer(payload.into_inner())?;
    let bid = state.bids.submit_bid(&user_id, id, offer).await?;
    Ok(HttpResponse::Created().json(BidResponse::from(bid)))
}

/// Bids on a commission, cheapest first. Artists see only their own.
#[utoipa::path(
    get,
    path = "/api/v1/commissions/{id}/bids",
    params(("id" = String, Path, description = "Commission id")),
    responses(
        (status = 200, description = "Bids", body = [BidResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Commission not found", body = ErrorSchema)
    ),
    tags = ["bids"],
    operation_id = "listBids"
)]
#[get("/commissions/{id}/bids")]
pub async fn list_bids(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<BidResponse>>> {
    let user_id = session.require_user_id()?;
    let id = commission_id(&path)?;
    let bids = state.bids_query.list_bids(&user_id, id).await?;
    Ok(web::Json(bids.into_iter().map(BidResponse::from).collect()))
}

/// Accept a bid, assigning its artist and rejecting every other bid.
///
/// Repeating the call for the accepted bid returns the current state.
#[utoipa::path(
    post,
    path = "/api/v1/bids/{id}/accept",
    params(("id" = String, Path, description = "Bid id")),
    responses(
        (status = 200, description = "Bid accepted", body = AcceptBidResult),
        (status = 403, description = "Not the commission owner", body = ErrorSchema),
        (status = 404, description = "Bid not found", body = ErrorSchema),
        (status = 409, description = "Commission no longer open", body = ErrorSchema),
        (status = 504, description = "Store timed out", body = ErrorSchema)
    ),
    tags = ["bids"],
    operation_id = "acceptBid"
)]
#[post("/bids/{id}/accept")]
pub async fn accept_bid(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AcceptBidResult>> {
    let user_id = session.require_user_id()?;
    let bid_id = parse_uuid(&path, FieldName::new("id"))?;
    let accepted = state.bids.accept_bid(&user_id, bid_id).await?;
    Ok(web::Json(accepted.into()))
}

#[cfg(test)]
#[path = "bids_tests.rs"]
mod tests;
