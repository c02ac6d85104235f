//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{Bio, DisplayName, Profile, Role, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProfileRow, ProfileRow, ProfileUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

/// Diesel-backed implementation of the profile repository port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    map_basic_diesel_error(
        error,
        ProfileRepositoryError::query,
        ProfileRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain profile.
fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    let invalid = |err: crate::domain::UserValidationError| {
        ProfileRepositoryError::query(format!("invalid profile row {}: {err}", row.id))
    };
    let role: Role = row.role.parse().map_err(invalid)?;
    let display_name = DisplayName::new(row.display_name.as_str()).map_err(invalid)?;
    let bio = Bio::parse(row.bio.clone()).map_err(invalid)?;
    Ok(Profile::new(
        UserId::from_uuid(row.id),
        role,
        display_name,
        bio,
        row.created_at,
    ))
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn insert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProfileRow {
            id: *profile.id().as_uuid(),
            role: profile.role().as_str(),
            display_name: profile.display_name().as_ref(),
            bio: profile.bio().map(AsRef::as_ref),
            created_at: profile.created_at(),
        };

        diesel::insert_into(profiles::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ProfileUpdate {
            display_name: profile.display_name().as_ref(),
            bio: profile.bio().map(AsRef::as_ref),
            updated_at: Utc::now(),
        };

        let updated = diesel::update(profiles::table.find(profile.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ProfileRepositoryError::query(format!(
                "profile {} does not exist",
                profile.id()
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = profiles::table
            .find(id.as_uuid())
            .select(ProfileRow::as_select())
            .first::<ProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_profile).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion.

    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn valid_row() -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            role: "artist".to_owned(),
            display_name: "Linework Lou".to_owned(),
            bio: Some("  Ink and watercolour  ".to_owned()),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, ProfileRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn rows_convert_to_profiles(valid_row: ProfileRow) {
        let id = valid_row.id;
        let profile = row_to_profile(valid_row).expect("valid row");

        assert_eq!(profile.id().as_uuid(), &id);
        assert_eq!(profile.role(), Role::Artist);
        assert_eq!(profile.bio().map(AsRef::<str>::as_ref), Some("Ink and watercolour"));
    }

    #[rstest]
    fn unknown_roles_are_query_errors(valid_row: ProfileRow) {
        let row = ProfileRow {
            role: "curator".to_owned(),
            ..valid_row
        };

        let err = row_to_profile(row).expect_err("role is unknown");

        assert!(matches!(err, ProfileRepositoryError::Query { .. }));
    }
}
