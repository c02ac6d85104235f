//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after a migration changes.

diesel::table! {
    /// Marketplace members and their fixed role.
    profiles (id) {
        id -> Uuid,
        /// `customer` or `artist`.
        role -> Varchar,
        display_name -> Varchar,
        bio -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Commission registry.
    ///
    /// `revision` is the compare-and-swap version bumped by every write.
    commissions (id) {
        id -> Uuid,
        customer_id -> Uuid,
        artist_id -> Nullable<Uuid>,
        title -> Varchar,
        description -> Text,
        category -> Nullable<Varchar>,
        budget_min -> Nullable<Int8>,
        budget_max -> Nullable<Int8>,
        deadline -> Nullable<Date>,
        status -> Varchar,
        customer_consent -> Bool,
        artist_consent -> Bool,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bid ledger. A partial unique index allows one non-rejected bid per
    /// artist per commission.
    bids (id) {
        id -> Uuid,
        commission_id -> Uuid,
        artist_id -> Uuid,
        amount -> Int8,
        estimated_days -> Nullable<Int4>,
        message -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(bids -> commissions (commission_id));

diesel::allow_tables_to_appear_in_same_query!(profiles, commissions, bids);
