//! Driving port for identity and profile mutations.

use async_trait::async_trait;

use crate::domain::{Error, Profile, Role, UserId};

/// Sign-up input. The role is fixed from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub display_name: String,
    pub role: Role,
    pub bio: Option<String>,
}

/// Partial profile edit.
///
/// `bio: Some(None)` clears the bio. `role` exists so a client that sends one
/// can be refused; it never changes the stored role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub role: Option<Role>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Create a profile under a fresh user id.
    async fn sign_up(&self, request: SignUpRequest) -> Result<Profile, Error>;

    /// Edit the caller's own display name or bio.
    async fn update_profile(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<Profile, Error>;
}
