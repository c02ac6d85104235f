//! Driving port for commission reads and the role-based dashboard.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Commission, CommissionStatus, Error, Role, StatusCounts, UserId};

/// Listing request. Party filters must name the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCommissionsRequest {
    pub customer_id: Option<UserId>,
    pub artist_id: Option<UserId>,
    pub status: Option<CommissionStatus>,
    pub cursor: Option<String>,
    pub page: PageRequest,
}

/// Role-based feed plus per-status totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub role: Role,
    pub commissions: Page<Commission>,
    pub counts: StatusCounts,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommissionQuery: Send + Sync {
    /// Fetch a commission visible to the caller, or `NotFound`.
    async fn get_commission(&self, user_id: &UserId, commission_id: Uuid)
    -> Result<Commission, Error>;

    /// One keyset page of commissions, newest first.
    async fn list_commissions(
        &self,
        user_id: &UserId,
        request: ListCommissionsRequest,
    ) -> Result<Page<Commission>, Error>;

    /// The caller's dashboard feed.
    async fn dashboard(
        &self,
        user_id: &UserId,
        cursor: Option<String>,
        page: PageRequest,
    ) -> Result<Dashboard, Error>;
}
