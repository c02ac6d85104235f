//! In-process marketplace store.
//!
//! Serves development runs without a database and the integration suites.
//! One write lock covers every table, so each commit is atomic and the
//! revision and duplicate-bid checks match the PostgreSQL adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CommissionCommit, CommissionRepository, CommissionRepositoryError, ProfileRepository,
    ProfileRepositoryError,
};
use crate::domain::{
    Bid, BidStatus, Commission, CommissionCursorKey, CommissionDraft, CommissionFilter,
    CommissionScope, CommissionStatus, Profile, StatusCounts, UserId, sort_for_review,
};

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    commissions: HashMap<Uuid, Commission>,
    bids: HashMap<Uuid, Bid>,
}

impl Tables {
    fn current(
        &self,
        commission_id: Uuid,
        expected: u32,
    ) -> Result<&Commission, CommissionRepositoryError> {
        self.commissions
            .get(&commission_id)
            .filter(|commission| commission.revision() == expected)
            .ok_or_else(|| CommissionRepositoryError::revision_mismatch(commission_id, expected))
    }

    fn has_active_bid(&self, commission_id: Uuid, artist_id: &UserId) -> bool {
        self.bids.values().any(|bid| {
            bid.commission_id() == commission_id
                && bid.artist_id() == artist_id
                && bid.status() != BidStatus::Rejected
        })
    }
}

/// Copy of `commission` one revision further on.
fn bumped(commission: &Commission) -> Result<Commission, CommissionRepositoryError> {
    Commission::new(CommissionDraft {
        id: commission.id(),
        customer_id: commission.customer_id().clone(),
        artist_id: commission.artist_id().cloned(),
        details: commission.details().clone(),
        status: commission.status(),
        consent: commission.consent(),
        revision: commission.revision().saturating_add(1),
        created_at: commission.created_at(),
    })
    .map_err(|err| CommissionRepositoryError::query(err.to_string()))
}

/// Profiles, commissions and bids held in process memory.
///
/// # Examples
/// ```
/// use commission_backend::outbound::memory::InMemoryMarketplace;
///
/// let store = InMemoryMarketplace::new();
/// # drop(store);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMarketplace {
    tables: RwLock<Tables>,
}

impl InMemoryMarketplace {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryMarketplace {
    async fn insert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(profile.id()) {
            return Err(ProfileRepositoryError::query(format!(
                "profile {} already exists",
                profile.id()
            )));
        }
        tables.profiles.insert(profile.id().clone(), profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.profiles.get_mut(profile.id()) else {
            return Err(ProfileRepositoryError::query(format!(
                "profile {} does not exist",
                profile.id()
            )));
        };
        *stored = stored
            .clone()
            .with_details(Some(profile.display_name().clone()), Some(profile.bio().cloned()));
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(self.tables.read().await.profiles.get(id).cloned())
    }
}

#[async_trait]
impl CommissionRepository for InMemoryMarketplace {
    async fn insert_commission(
        &self,
        commission: &Commission,
    ) -> Result<(), CommissionRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.commissions.contains_key(&commission.id()) {
            return Err(CommissionRepositoryError::query(format!(
                "commission {} already exists",
                commission.id()
            )));
        }
        tables.commissions.insert(commission.id(), commission.clone());
        Ok(())
    }

    async fn find_commission(
        &self,
        id: Uuid,
    ) -> Result<Option<Commission>, CommissionRepositoryError> {
        Ok(self.tables.read().await.commissions.get(&id).cloned())
    }

    async fn commit(&self, commit: &CommissionCommit) -> Result<(), CommissionRepositoryError> {
        let commission_id = commit.commission.id();
        let mut tables = self.tables.write().await;
        tables.current(commission_id, commit.expected_revision)?;
        if let Some(stray) = commit
            .bids
            .iter()
            .find(|bid| bid.commission_id() != commission_id || !tables.bids.contains_key(&bid.id()))
        {
            return Err(CommissionRepositoryError::query(format!(
                "bid {} does not belong to commission {commission_id}",
                stray.id()
            )));
        }

        tables
            .commissions
            .insert(commission_id, commit.commission.clone());
        for bid in &commit.bids {
            tables.bids.insert(bid.id(), bid.clone());
        }
        debug!(
            %commission_id,
            revision = commit.commission.revision(),
            bids = commit.bids.len(),
            "commission committed"
        );
        Ok(())
    }

    async fn list_commissions(
        &self,
        filter: &CommissionFilter,
        after: Option<CommissionCursorKey>,
        limit: usize,
    ) -> Result<Vec<Commission>, CommissionRepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Commission> = tables
            .commissions
            .values()
            .filter(|commission| filter.matches(commission))
            .filter(|commission| {
                after.is_none_or(|key| key.precedes(&CommissionCursorKey::of(commission)))
            })
            .collect();
        rows.sort_by(|left, right| {
            CommissionCursorKey::of(left).listing_cmp(&CommissionCursorKey::of(right))
        });
        Ok(rows.into_iter().take(limit).cloned().collect())
    }

    async fn status_counts(
        &self,
        scope: &CommissionScope,
    ) -> Result<StatusCounts, CommissionRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .commissions
            .values()
            .filter(|commission| scope.admits(commission))
            .collect())
    }

    async fn submit_bid(
        &self,
        bid: &Bid,
        expected_revision: u32,
    ) -> Result<(), CommissionRepositoryError> {
        let commission_id = bid.commission_id();
        let mut tables = self.tables.write().await;
        let current = tables.current(commission_id, expected_revision)?;
        if current.status() != CommissionStatus::Open {
            return Err(CommissionRepositoryError::revision_mismatch(
                commission_id,
                expected_revision,
            ));
        }
        if tables.has_active_bid(commission_id, bid.artist_id()) {
            return Err(CommissionRepositoryError::duplicate_bid(
                commission_id,
                bid.artist_id().clone(),
            ));
        }

        let next = bumped(current)?;
        tables.commissions.insert(commission_id, next);
        tables.bids.insert(bid.id(), bid.clone());
        Ok(())
    }

    async fn find_bid(&self, id: Uuid) -> Result<Option<Bid>, CommissionRepositoryError> {
        Ok(self.tables.read().await.bids.get(&id).cloned())
    }

    async fn list_bids(&self, commission_id: Uuid) -> Result<Vec<Bid>, CommissionRepositoryError> {
        let tables = self.tables.read().await;
        let mut bids: Vec<Bid> = tables
            .bids
            .values()
            .filter(|bid| bid.commission_id() == commission_id)
            .cloned()
            .collect();
        sort_for_review(&mut bids);
        Ok(bids)
    }
}

#[cfg(test)]
mod tests;
