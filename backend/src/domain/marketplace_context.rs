//! Collaborators shared by the commission and bid services.

use std::sync::Arc;

use mockable::Clock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::commission_locks::CommissionLocks;
use crate::domain::ports::{
    CommissionCommit, CommissionRepository, CommissionRepositoryError, LifecycleEvent,
    LifecycleNotifier, ProfileRepository,
};
use crate::domain::service_support::{
    ServiceTimeouts, announce, bounded, map_commission_repository_error, resolve_actor,
};
use crate::domain::{Actor, Bid, Commission, CommissionStatus, Error, Role, UserId};

/// Ports, lock registry, clock and deadlines used by the marketplace services.
pub struct MarketplaceContext<R, P, N> {
    pub(crate) commissions: Arc<R>,
    pub(crate) profiles: Arc<P>,
    pub(crate) notifier: Arc<N>,
    pub(crate) locks: Arc<CommissionLocks>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) timeouts: ServiceTimeouts,
}

impl<R, P, N> Clone for MarketplaceContext<R, P, N> {
    fn clone(&self) -> Self {
        Self {
            commissions: Arc::clone(&self.commissions),
            profiles: Arc::clone(&self.profiles),
            notifier: Arc::clone(&self.notifier),
            locks: Arc::clone(&self.locks),
            clock: Arc::clone(&self.clock),
            timeouts: self.timeouts,
        }
    }
}

impl<R, P, N> MarketplaceContext<R, P, N> {
    /// Bundle the collaborators.
    ///
    /// Services that mutate the same commissions must share `locks`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use commission_backend::domain::ports::{FixtureCommissionRepository, FixtureLifecycleNotifier};
    /// use commission_backend::domain::{
    ///     BidService, CommissionLocks, CommissionService, MarketplaceContext, ServiceTimeouts,
    /// };
    /// use commission_backend::outbound::memory::InMemoryMarketplace;
    /// use mockable::DefaultClock;
    ///
    /// let context = MarketplaceContext::new(
    ///     Arc::new(FixtureCommissionRepository),
    ///     Arc::new(InMemoryMarketplace::default()),
    ///     Arc::new(FixtureLifecycleNotifier),
    ///     Arc::new(CommissionLocks::new()),
    ///     Arc::new(DefaultClock),
    ///     ServiceTimeouts::default(),
    /// );
    /// let _commissions = CommissionService::new(context.clone());
    /// let _bids = BidService::new(context);
    /// ```
    pub fn new(
        commissions: Arc<R>,
        profiles: Arc<P>,
        notifier: Arc<N>,
        locks: Arc<CommissionLocks>,
        clock: Arc<dyn Clock>,
        timeouts: ServiceTimeouts,
    ) -> Self {
        Self {
            commissions,
            profiles,
            notifier,
            locks,
            clock,
            timeouts,
        }
    }
}

impl<R, P, N> MarketplaceContext<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    pub(crate) async fn actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        resolve_actor(self.profiles.as_ref(), user_id, self.timeouts.repository).await
    }

    pub(crate) async fn commission(&self, id: Uuid) -> Result<Commission, Error> {
        bounded(
            self.timeouts.repository,
            "commission lookup",
            map_commission_repository_error,
            self.commissions.find_commission(id),
        )
        .await?
        .ok_or_else(|| commission_not_found(id))
    }

    pub(crate) async fn bids(&self, commission_id: Uuid) -> Result<Vec<Bid>, Error> {
        bounded(
            self.timeouts.repository,
            "bid listing",
            map_commission_repository_error,
            self.commissions.list_bids(commission_id),
        )
        .await
    }

    /// Commit a mutation, reporting a lost revision race as `Ok(false)`.
    pub(crate) async fn try_commit(&self, commit: &CommissionCommit) -> Result<bool, Error> {
        let limit = self.timeouts.repository;
        match tokio::time::timeout(limit, self.commissions.commit(commit)).await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(CommissionRepositoryError::RevisionMismatch { .. })) => Ok(false),
            Ok(Err(err)) => Err(map_commission_repository_error(err)),
            Err(_) => Err(Error::timeout(format!(
                "commission commit did not complete within {}ms",
                limit.as_millis()
            ))),
        }
    }

    pub(crate) async fn commit(&self, commit: &CommissionCommit) -> Result<(), Error> {
        if self.try_commit(commit).await? {
            Ok(())
        } else {
            let id = commit.commission.id();
            Err(Error::invalid_state(format!(
                "commission {id} changed concurrently; reload and retry"
            )))
        }
    }

    /// Whether the actor may see the commission at all.
    pub(crate) async fn can_see(
        &self,
        actor: &Actor,
        commission: &Commission,
    ) -> Result<bool, Error> {
        if commission.is_owned_by(&actor.user_id) || commission.is_assigned_to(&actor.user_id) {
            return Ok(true);
        }
        if actor.role != Role::Artist {
            return Ok(false);
        }
        if commission.status() == CommissionStatus::Open {
            return Ok(true);
        }
        let bids = self.bids(commission.id()).await?;
        Ok(bids.iter().any(|bid| bid.artist_id() == &actor.user_id))
    }

    /// Fetch a commission, reporting invisible ones as missing.
    pub(crate) async fn visible_commission(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<Commission, Error> {
        let commission = self.commission(id).await?;
        if self.can_see(actor, &commission).await? {
            Ok(commission)
        } else {
            Err(commission_not_found(id))
        }
    }

    /// Start delivering `events` without waiting for the notifier.
    pub(crate) fn announce(&self, events: Vec<LifecycleEvent>) -> JoinHandle<()> {
        announce(Arc::clone(&self.notifier), self.timeouts.notifier, events)
    }
}

pub(crate) fn commission_not_found(id: Uuid) -> Error {
    Error::not_found(format!("commission {id} not found"))
}
