//! Driven port for commission and bid storage.
//!
//! Every write that touches a commission checks its `revision` inside one
//! transaction. Adapters report a lost race as
//! [`CommissionRepositoryError::RevisionMismatch`] and leave storage as it
//! was.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Bid, Commission, CommissionCursorKey, CommissionFilter, CommissionScope, StatusCounts, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by commission repository adapters.
    pub enum CommissionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "commission repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "commission repository query failed: {message}",
        /// The commission changed since it was read, or is no longer open for bids.
        RevisionMismatch { commission_id: Uuid, expected: u32 } =>
            "commission {commission_id} no longer matches revision {expected}",
        /// The artist already holds a pending or accepted bid on the commission.
        DuplicateBid { commission_id: Uuid, artist_id: UserId } =>
            "artist {artist_id} already has an active bid on commission {commission_id}",
    }
}

/// A commission mutation plus the bid updates that must land with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionCommit {
    /// Next commission value; its revision is `expected_revision + 1`.
    pub commission: Commission,
    /// Revision the caller read before deciding.
    pub expected_revision: u32,
    /// Bids whose status changes in the same transaction.
    pub bids: Vec<Bid>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommissionRepository: Send + Sync {
    /// Store a freshly posted commission.
    async fn insert_commission(&self, commission: &Commission)
    -> Result<(), CommissionRepositoryError>;

    /// Fetch a commission by identifier.
    async fn find_commission(&self, id: Uuid)
    -> Result<Option<Commission>, CommissionRepositoryError>;

    /// Apply a commission mutation and its bid updates atomically.
    async fn commit(&self, commit: &CommissionCommit) -> Result<(), CommissionRepositoryError>;

    /// Read up to `limit` commissions matching `filter` in listing order,
    /// strictly after `after` when given.
    async fn list_commissions(
        &self,
        filter: &CommissionFilter,
        after: Option<CommissionCursorKey>,
        limit: usize,
    ) -> Result<Vec<Commission>, CommissionRepositoryError>;

    /// Count commissions per status within `scope`.
    async fn status_counts(
        &self,
        scope: &CommissionScope,
    ) -> Result<StatusCounts, CommissionRepositoryError>;

    /// Insert a pending bid while the commission is still `open` at
    /// `expected_revision`, bumping the revision.
    async fn submit_bid(
        &self,
        bid: &Bid,
        expected_revision: u32,
    ) -> Result<(), CommissionRepositoryError>;

    /// Fetch a bid by identifier.
    async fn find_bid(&self, id: Uuid) -> Result<Option<Bid>, CommissionRepositoryError>;

    /// Every bid on a commission, best offer first.
    async fn list_bids(&self, commission_id: Uuid) -> Result<Vec<Bid>, CommissionRepositoryError>;
}

/// Fixture repository that stores nothing and finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommissionRepository;

#[async_trait]
impl CommissionRepository for FixtureCommissionRepository {
    async fn insert_commission(
        &self,
        _commission: &Commission,
    ) -> Result<(), CommissionRepositoryError> {
        Ok(())
    }

    async fn find_commission(
        &self,
        _id: Uuid,
    ) -> Result<Option<Commission>, CommissionRepositoryError> {
        Ok(None)
    }

    async fn commit(&self, _commit: &CommissionCommit) -> Result<(), CommissionRepositoryError> {
        Ok(())
    }

    async fn list_commissions(
        &self,
        _filter: &CommissionFilter,
        _after: Option<CommissionCursorKey>,
        _limit: usize,
    ) -> Result<Vec<Commission>, CommissionRepositoryError> {
        Ok(Vec::new())
    }

    async fn status_counts(
        &self,
        _scope: &CommissionScope,
    ) -> Result<StatusCounts, CommissionRepositoryError> {
        Ok(StatusCounts::default())
    }

    async fn submit_bid(
        &self,
        _bid: &Bid,
        _expected_revision: u32,
    ) -> Result<(), CommissionRepositoryError> {
        Ok(())
    }

    async fn find_bid(&self, _id: Uuid) -> Result<Option<Bid>, CommissionRepositoryError> {
        Ok(None)
    }

    async fn list_bids(&self, _commission_id: Uuid) -> Result<Vec<Bid>, CommissionRepositoryError> {
        Ok(Vec::new())
    }
}
