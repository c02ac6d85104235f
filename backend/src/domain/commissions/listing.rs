//! Listing filters, ordering keys and dashboard summaries.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commission::Commission;
use super::status::CommissionStatus;
use crate::domain::UserId;

/// Which commissions a listing may include.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommissionScope {
    /// No ownership restriction.
    #[default]
    Any,
    /// Commissions posted by this customer.
    Customer(UserId),
    /// Commissions assigned to this artist.
    Artist(UserId),
    /// An artist's workspace: assigned to them, or still open.
    ArtistWorkspace(UserId),
}

impl CommissionScope {
    pub fn admits(&self, commission: &Commission) -> bool {
        match self {
            Self::Any => true,
            Self::Customer(id) => commission.is_owned_by(id),
            Self::Artist(id) => commission.is_assigned_to(id),
            Self::ArtistWorkspace(id) => {
                commission.is_assigned_to(id) || commission.status() == CommissionStatus::Open
            }
        }
    }
}

/// Listing filter combining an ownership scope and an optional status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommissionFilter {
    pub scope: CommissionScope,
    pub status: Option<CommissionStatus>,
}

impl CommissionFilter {
    pub fn matches(&self, commission: &Commission) -> bool {
        self.scope.admits(commission) && self.status.is_none_or(|s| commission.status() == s)
    }
}

/// Keyset position in the newest-first listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionCursorKey {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl CommissionCursorKey {
    pub fn of(commission: &Commission) -> Self {
        Self {
            created_at: commission.created_at(),
            id: commission.id(),
        }
    }

    /// Compare two keys in listing order: newest first, then id ascending.
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Whether `other` sorts strictly after this key.
    pub fn precedes(&self, other: &Self) -> bool {
        self.listing_cmp(other) == Ordering::Less
    }
}

/// Per-status totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: u64,
    pub open: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: CommissionStatus, count: u64) {
        let slot = match status {
            CommissionStatus::Open => &mut self.open,
            CommissionStatus::Assigned => &mut self.assigned,
            CommissionStatus::InProgress => &mut self.in_progress,
            CommissionStatus::Completed => &mut self.completed,
            CommissionStatus::Cancelled => &mut self.cancelled,
        };
        *slot += count;
        self.total += count;
    }
}

impl<'a> FromIterator<&'a Commission> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a Commission>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut counts, c| {
            counts.record(c.status(), 1);
            counts
        })
    }
}
