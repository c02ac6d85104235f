//! Bid ledger services.
//!
//! Accepting a bid settles the whole ledger of its commission in one commit:
//! the winner is accepted, every other pending bid is rejected and the
//! commission is assigned. Repeating an accept on the winning bid returns the
//! settled state without writing or notifying again.

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::marketplace_context::MarketplaceContext;
use crate::domain::ports::{
    AcceptBidResponse, BidCommand, BidQuery, CommissionCommit, CommissionRepository,
    LifecycleEvent, LifecycleNotifier, ProfileRepository, SubmitBidRequest,
};
use crate::domain::service_support::{bounded, invalid_field, map_commission_repository_error};
use crate::domain::{
    Actor, Bid, BidStatus, BidTerms, Commission, CommissionStatus, Error, Role, UserId,
    settle_bids,
};

/// Service implementing the bid driving ports.
pub struct BidService<R, P, N> {
    context: MarketplaceContext<R, P, N>,
}

impl<R, P, N> Clone for BidService<R, P, N> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<R, P, N> BidService<R, P, N> {
    pub fn new(context: MarketplaceContext<R, P, N>) -> Self {
        Self { context }
    }
}

fn bid_not_found(id: Uuid) -> Error {
    Error::not_found(format!("bid {id} not found"))
}

fn ensure_owner(actor: &Actor, commission: &Commission) -> Result<(), Error> {
    if actor.role == Role::Customer && commission.is_owned_by(&actor.user_id) {
        Ok(())
    } else {
        Err(Error::permission_denied(
            "only the customer who posted the commission may accept its bids",
        ))
    }
}

impl<R, P, N> BidService<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    async fn find_bid(&self, id: Uuid) -> Result<Bid, Error> {
        bounded(
            self.context.timeouts.repository,
            "bid lookup",
            map_commission_repository_error,
            self.context.commissions.find_bid(id),
        )
        .await?
        .ok_or_else(|| bid_not_found(id))
    }

    /// Current state of a bid that some writer already accepted.
    async fn settled_state(&self, bid_id: Uuid) -> Result<Option<AcceptBidResponse>, Error> {
        let bid = self.find_bid(bid_id).await?;
        if bid.status() != BidStatus::Accepted {
            return Ok(None);
        }
        let commission = self.context.commission(bid.commission_id()).await?;
        Ok(Some(AcceptBidResponse { commission, bid }))
    }
}

#[async_trait]
impl<R, P, N> BidCommand for BidService<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    async fn submit_bid(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
        request: SubmitBidRequest,
    ) -> Result<Bid, Error> {
        let actor = self.context.actor(user_id).await?;
        if actor.role != Role::Artist {
            return Err(Error::role_required(Role::Artist));
        }
        let terms = BidTerms::new(
            request.amount,
            request.estimated_days,
            request.message.as_deref(),
        )
        .map_err(|err| invalid_field(Some(err.field()), err))?;

        let _guard = self.context.locks.acquire(commission_id).await;
        let commission = self.context.commission(commission_id).await?;
        if commission.status() != CommissionStatus::Open {
            return Err(Error::invalid_state(format!(
                "commission {commission_id} is {} and no longer accepts bids",
                commission.status()
            )));
        }

        let bid = Bid::pending(
            Uuid::new_v4(),
            commission_id,
            actor.user_id,
            terms,
            self.context.clock.utc(),
        );
        bounded(
            self.context.timeouts.repository,
            "bid submission",
            map_commission_repository_error,
            self.context
                .commissions
                .submit_bid(&bid, commission.revision()),
        )
        .await?;
        info!(
            %commission_id,
            bid_id = %bid.id(),
            artist_id = %bid.artist_id(),
            amount = bid.amount().get(),
            "bid submitted"
        );
        Ok(bid)
    }

    async fn accept_bid(&self, user_id: &UserId, bid_id: Uuid) -> Result<AcceptBidResponse, Error> {
        let actor = self.context.actor(user_id).await?;
        let commission_id = self.find_bid(bid_id).await?.commission_id();

        let guard = self.context.locks.acquire(commission_id).await;
        let commission = self.context.commission(commission_id).await?;
        ensure_owner(&actor, &commission)?;

        let bids = self.context.bids(commission_id).await?;
        let winner = bids
            .iter()
            .find(|bid| bid.id() == bid_id)
            .cloned()
            .ok_or_else(|| bid_not_found(bid_id))?;
        if winner.status() == BidStatus::Accepted {
            info!(%commission_id, %bid_id, "bid already accepted");
            return Ok(AcceptBidResponse {
                commission,
                bid: winner,
            });
        }

        let settlement = settle_bids(&commission, &winner, bids)?;
        let rejected = settlement.rejected.len();
        let mut changed = Vec::with_capacity(rejected + 1);
        changed.push(settlement.accepted.clone());
        changed.extend(settlement.rejected);
        let commit = CommissionCommit {
            commission: settlement.commission,
            expected_revision: commission.revision(),
            bids: changed,
        };

        if !self.context.try_commit(&commit).await? {
            drop(guard);
            warn!(%commission_id, %bid_id, "bid acceptance lost a revision race");
            return match self.settled_state(bid_id).await? {
                Some(state) => Ok(state),
                None => Err(Error::invalid_state(format!(
                    "commission {commission_id} is no longer open for acceptance"
                ))),
            };
        }
        drop(guard);

        let accepted = settlement.accepted;
        let assigned = commit.commission;
        info!(%commission_id, %bid_id, rejected, "bid accepted");
        let _delivery = self.context.announce(vec![
            LifecycleEvent::BidAccepted {
                commission_id,
                bid_id,
                artist_id: accepted.artist_id().clone(),
                customer_id: assigned.customer_id().clone(),
                amount: accepted.amount().get(),
            },
            LifecycleEvent::StatusChanged {
                commission_id,
                from: CommissionStatus::Open,
                to: CommissionStatus::Assigned,
            },
        ]);
        Ok(AcceptBidResponse {
            commission: assigned,
            bid: accepted,
        })
    }
}

#[async_trait]
impl<R, P, N> BidQuery for BidService<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    async fn list_bids(&self, user_id: &UserId, commission_id: Uuid) -> Result<Vec<Bid>, Error> {
        let actor = self.context.actor(user_id).await?;
        let commission = self.context.commission(commission_id).await?;
        let bids = self.context.bids(commission_id).await?;

        match actor.role {
            Role::Customer if commission.is_owned_by(&actor.user_id) => Ok(bids),
            Role::Artist => Ok(bids
                .into_iter()
                .filter(|bid| bid.artist_id() == &actor.user_id)
                .collect()),
            Role::Customer => Err(Error::permission_denied(
                "only the customer who posted the commission may review its bids",
            )),
        }
    }
}

#[cfg(test)]
#[path = "bid_service_tests.rs"]
mod tests;
