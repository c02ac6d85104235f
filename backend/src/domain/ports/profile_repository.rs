//! Port abstraction for profile persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Profile, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "profile repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile.
    async fn insert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// Persist edited display name and bio. The stored role is left untouched.
    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;

    /// Fetch a profile by user identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError>;
}
