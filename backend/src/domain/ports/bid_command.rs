//! Driving port for bid submission and acceptance.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Bid, Commission, Error, UserId};

/// Raw offer terms from an artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBidRequest {
    pub amount: i64,
    pub estimated_days: Option<i64>,
    pub message: Option<String>,
}

/// State after an accept: the winning bid and its assigned commission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptBidResponse {
    pub commission: Commission,
    pub bid: Bid,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BidCommand: Send + Sync {
    /// Place a pending bid on an open commission as the session artist.
    async fn submit_bid(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
        request: SubmitBidRequest,
    ) -> Result<Bid, Error>;

    /// Accept a bid as the owning customer. Accepting an already accepted
    /// bid returns the current state.
    async fn accept_bid(&self, user_id: &UserId, bid_id: Uuid) -> Result<AcceptBidResponse, Error>;
}
