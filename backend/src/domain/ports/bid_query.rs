//! Driving port for bid ledger reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Bid, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BidQuery: Send + Sync {
    /// Bids on a commission, cheapest first then earliest.
    ///
    /// The owning customer sees every bid, an artist only their own.
    async fn list_bids(&self, user_id: &UserId, commission_id: Uuid) -> Result<Vec<Bid>, Error>;
}
