//! Driving port for profile reads and actor resolution.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Profile, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Return the profile for `user_id`, or `NotFound`.
    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, Error>;

    /// Resolve a session user into an actor using the stored role.
    ///
    /// A session user without a profile is refused with a permission error.
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error>;
}
