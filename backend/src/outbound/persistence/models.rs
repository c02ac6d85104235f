//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{bids, commissions, profiles};

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub role: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new profiles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub role: &'a str,
    pub display_name: &'a str,
    pub bio: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for profile edits. The role column is never written here.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileUpdate<'a> {
    pub display_name: &'a str,
    pub bio: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Commission models
// ---------------------------------------------------------------------------

/// Row struct for reading from the commissions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = commissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommissionRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub artist_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub status: String,
    pub customer_consent: bool,
    pub artist_consent: bool,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for freshly posted commissions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = commissions)]
pub(crate) struct NewCommissionRow<'a> {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: Option<&'a str>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub status: &'a str,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
}

/// Full changeset written by a revision-checked commit.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = commissions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CommissionUpdate<'a> {
    pub artist_id: Option<Uuid>,
    pub title: &'a str,
    pub description: &'a str,
    pub category: Option<&'a str>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub status: &'a str,
    pub customer_consent: bool,
    pub artist_consent: bool,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bid models
// ---------------------------------------------------------------------------

/// Row struct for reading from the bids table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bids)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BidRow {
    pub id: Uuid,
    pub commission_id: Uuid,
    pub artist_id: Uuid,
    pub amount: i64,
    pub estimated_days: Option<i32>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new pending bids.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bids)]
pub(crate) struct NewBidRow<'a> {
    pub id: Uuid,
    pub commission_id: Uuid,
    pub artist_id: Uuid,
    pub amount: i64,
    pub estimated_days: Option<i32>,
    pub message: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}
