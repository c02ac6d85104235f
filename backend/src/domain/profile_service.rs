//! Identity and role store services.
//!
//! Sign-up fixes the role. Later edits touch the display name and bio only.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ProfileChanges, ProfileCommand, ProfileQuery, ProfileRepository, SignUpRequest,
};
use crate::domain::service_support::{
    ServiceTimeouts, bounded, invalid_field, map_profile_repository_error, resolve_actor,
};
use crate::domain::{Actor, Bio, DisplayName, Error, Profile, UserId};

/// Profile service implementing the identity driving ports.
#[derive(Clone)]
pub struct ProfileService<P> {
    profiles: Arc<P>,
    clock: Arc<dyn Clock>,
    timeouts: ServiceTimeouts,
}

impl<P> ProfileService<P> {
    pub fn new(profiles: Arc<P>, clock: Arc<dyn Clock>, timeouts: ServiceTimeouts) -> Self {
        Self {
            profiles,
            clock,
            timeouts,
        }
    }
}

impl<P> ProfileService<P>
where
    P: ProfileRepository,
{
    async fn load(&self, user_id: &UserId) -> Result<Profile, Error> {
        bounded(
            self.timeouts.repository,
            "profile lookup",
            map_profile_repository_error,
            self.profiles.find_by_id(user_id),
        )
        .await?
        .ok_or_else(|| Error::not_found(format!("profile {user_id} not found")))
    }
}

#[async_trait]
impl<P> ProfileCommand for ProfileService<P>
where
    P: ProfileRepository,
{
    async fn sign_up(&self, request: SignUpRequest) -> Result<Profile, Error> {
        let display_name = DisplayName::new(request.display_name)
            .map_err(|err| invalid_field(Some("displayName"), err))?;
        let bio = Bio::parse(request.bio).map_err(|err| invalid_field(Some("bio"), err))?;
        let profile = Profile::new(
            UserId::random(),
            request.role,
            display_name,
            bio,
            self.clock.utc(),
        );

        bounded(
            self.timeouts.repository,
            "profile insert",
            map_profile_repository_error,
            self.profiles.insert(&profile),
        )
        .await?;
        info!(user_id = %profile.id(), role = %profile.role(), "profile created");
        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<Profile, Error> {
        let current = self.load(user_id).await?;
        if changes.role.is_some_and(|role| role != current.role()) {
            return Err(invalid_field(
                Some("role"),
                "role is fixed at sign-up and cannot be changed",
            ));
        }

        let display_name = changes
            .display_name
            .map(DisplayName::new)
            .transpose()
            .map_err(|err| invalid_field(Some("displayName"), err))?;
        let bio = changes
            .bio
            .map(Bio::parse)
            .transpose()
            .map_err(|err| invalid_field(Some("bio"), err))?;
        let updated = current.with_details(display_name, bio);

        bounded(
            self.timeouts.repository,
            "profile update",
            map_profile_repository_error,
            self.profiles.update(&updated),
        )
        .await?;
        Ok(updated)
    }
}

#[async_trait]
impl<P> ProfileQuery for ProfileService<P>
where
    P: ProfileRepository,
{
    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, Error> {
        self.load(user_id).await
    }

    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        resolve_actor(self.profiles.as_ref(), user_id, self.timeouts.repository).await
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
