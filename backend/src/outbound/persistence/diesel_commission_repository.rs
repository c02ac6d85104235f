//! PostgreSQL-backed `CommissionRepository` implementation using Diesel ORM.
//!
//! Writes run in one transaction guarded by `UPDATE ... WHERE revision = $n`.
//! Zero affected rows means another writer got there first. The partial
//! unique index on `bids` enforces one active bid per artist.

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommissionCommit, CommissionRepository, CommissionRepositoryError};
use crate::domain::{
    Bid, BidStatus, BidTerms, Commission, CommissionCursorKey, CommissionDetails,
    CommissionDetailsDraft, CommissionDraft, CommissionFilter, CommissionScope, CommissionStatus,
    Consent, StatusCounts, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BidRow, CommissionRow, CommissionUpdate, NewBidRow, NewCommissionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bids, commissions};

/// Diesel-backed implementation of the commission repository port.
#[derive(Clone)]
pub struct DieselCommissionRepository {
    pool: DbPool,
}

impl DieselCommissionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a revision-checked transaction.
enum TxError {
    Diesel(DieselError),
    Repository(CommissionRepositoryError),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl TxError {
    fn into_repository_error(self) -> CommissionRepositoryError {
        match self {
            Self::Diesel(error) => map_diesel_error(error),
            Self::Repository(error) => error,
        }
    }
}

fn map_pool_error(error: PoolError) -> CommissionRepositoryError {
    map_basic_pool_error(error, CommissionRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> CommissionRepositoryError {
    map_basic_diesel_error(
        error,
        CommissionRepositoryError::query,
        CommissionRepositoryError::connection,
    )
}

fn is_unique_violation(error: &TxError) -> bool {
    matches!(
        error,
        TxError::Diesel(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _
        ))
    )
}

fn revision_to_db(revision: u32) -> Result<i32, CommissionRepositoryError> {
    i32::try_from(revision).map_err(|_| {
        CommissionRepositoryError::query(format!("revision {revision} exceeds storage range"))
    })
}

fn amount_to_db(value: u64, column: &str) -> Result<i64, CommissionRepositoryError> {
    i64::try_from(value).map_err(|_| {
        CommissionRepositoryError::query(format!("{column} {value} exceeds storage range"))
    })
}

fn optional_amount_to_db(
    value: Option<u64>,
    column: &str,
) -> Result<Option<i64>, CommissionRepositoryError> {
    value.map(|amount| amount_to_db(amount, column)).transpose()
}

fn commission_update(
    commission: &Commission,
) -> Result<CommissionUpdate<'_>, CommissionRepositoryError> {
    let details = commission.details();
    let consent = commission.consent();
    Ok(CommissionUpdate {
        artist_id: commission.artist_id().map(|id| *id.as_uuid()),
        title: details.title(),
        description: details.description(),
        category: details.category().map(AsRef::as_ref),
        budget_min: optional_amount_to_db(details.budget().min(), "budget_min")?,
        budget_max: optional_amount_to_db(details.budget().max(), "budget_max")?,
        deadline: details.deadline(),
        status: commission.status().as_str(),
        customer_consent: consent.customer,
        artist_consent: consent.artist,
        revision: revision_to_db(commission.revision())?,
        updated_at: Utc::now(),
    })
}

/// Convert a database row into a validated domain commission.
fn row_to_commission(row: CommissionRow) -> Result<Commission, CommissionRepositoryError> {
    let id = row.id;
    let invalid = |detail: String| {
        CommissionRepositoryError::query(format!("invalid commission row {id}: {detail}"))
    };
    let status: CommissionStatus = row.status.parse().map_err(|err| invalid(format!("{err}")))?;
    let revision = u32::try_from(row.revision).map_err(|err| invalid(err.to_string()))?;
    let details = CommissionDetails::new(
        CommissionDetailsDraft {
            title: row.title,
            description: row.description,
            category: row.category,
            budget_min: row.budget_min,
            budget_max: row.budget_max,
            deadline: row.deadline,
        },
        row.created_at.date_naive(),
    )
    .map_err(|err| invalid(err.to_string()))?;

    Commission::new(CommissionDraft {
        id,
        customer_id: UserId::from_uuid(row.customer_id),
        artist_id: row.artist_id.map(UserId::from_uuid),
        details,
        status,
        consent: Consent {
            customer: row.customer_consent,
            artist: row.artist_consent,
        },
        revision,
        created_at: row.created_at,
    })
    .map_err(|err| invalid(err.to_string()))
}

/// Convert a database row into a domain bid.
fn row_to_bid(row: BidRow) -> Result<Bid, CommissionRepositoryError> {
    let id = row.id;
    let invalid =
        |detail: String| CommissionRepositoryError::query(format!("invalid bid row {id}: {detail}"));
    let status: BidStatus = row.status.parse().map_err(|err| invalid(format!("{err}")))?;
    let terms = BidTerms::new(
        row.amount,
        row.estimated_days.map(i64::from),
        row.message.as_deref(),
    )
    .map_err(|err| invalid(err.to_string()))?;

    Ok(Bid::restore(
        id,
        row.commission_id,
        UserId::from_uuid(row.artist_id),
        terms,
        status,
        row.created_at,
    ))
}

/// Restrict a boxed commission query to a listing scope.
fn scoped<'a, ST: 'a>(
    query: commissions::BoxedQuery<'a, Pg, ST>,
    scope: &CommissionScope,
) -> commissions::BoxedQuery<'a, Pg, ST> {
    match scope {
        CommissionScope::Any => query,
        CommissionScope::Customer(id) => query.filter(commissions::customer_id.eq(*id.as_uuid())),
        CommissionScope::Artist(id) => query.filter(commissions::artist_id.eq(*id.as_uuid())),
        CommissionScope::ArtistWorkspace(id) => query.filter(
            commissions::artist_id
                .eq(*id.as_uuid())
                .or(commissions::status.eq(CommissionStatus::Open.as_str())),
        ),
    }
}

#[async_trait]
impl CommissionRepository for DieselCommissionRepository {
    async fn insert_commission(
        &self,
        commission: &Commission,
    ) -> Result<(), CommissionRepositoryError> {
        let details = commission.details();
        let row = NewCommissionRow {
            id: commission.id(),
            customer_id: *commission.customer_id().as_uuid(),
            title: details.title(),
            description: details.description(),
            category: details.category().map(AsRef::as_ref),
            budget_min: optional_amount_to_db(details.budget().min(), "budget_min")?,
            budget_max: optional_amount_to_db(details.budget().max(), "budget_max")?,
            deadline: details.deadline(),
            status: commission.status().as_str(),
            revision: revision_to_db(commission.revision())?,
            created_at: commission.created_at(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(commissions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_commission(
        &self,
        id: Uuid,
    ) -> Result<Option<Commission>, CommissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = commissions::table
            .find(id)
            .select(CommissionRow::as_select())
            .first::<CommissionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_commission).transpose()
    }

    async fn commit(&self, commit: &CommissionCommit) -> Result<(), CommissionRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let commission_id = commit.commission.id();
        let expected_revision = commit.expected_revision;
        let expected = revision_to_db(expected_revision)?;
        let changes = commission_update(&commit.commission)?;
        let bid_updates: Vec<(Uuid, &'static str)> = commit
            .bids
            .iter()
            .map(|bid| (bid.id(), bid.status().as_str()))
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let updated = diesel::update(
                    commissions::table
                        .filter(commissions::id.eq(commission_id))
                        .filter(commissions::revision.eq(expected)),
                )
                .set(&changes)
                .execute(conn)
                .await?;
                if updated == 0 {
                    return Err(TxError::Repository(
                        CommissionRepositoryError::revision_mismatch(
                            commission_id,
                            expected_revision,
                        ),
                    ));
                }

                for (bid_id, status) in bid_updates {
                    let touched = diesel::update(
                        bids::table
                            .filter(bids::id.eq(bid_id))
                            .filter(bids::commission_id.eq(commission_id)),
                    )
                    .set(bids::status.eq(status))
                    .execute(conn)
                    .await?;
                    if touched == 0 {
                        return Err(TxError::Repository(CommissionRepositoryError::query(
                            format!("bid {bid_id} does not belong to commission {commission_id}"),
                        )));
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(TxError::into_repository_error)
    }

    async fn list_commissions(
        &self,
        filter: &CommissionFilter,
        after: Option<CommissionCursorKey>,
        limit: usize,
    ) -> Result<Vec<Commission>, CommissionRepositoryError> {
        let mut query = scoped(
            commissions::table
                .select(CommissionRow::as_select())
                .into_boxed(),
            &filter.scope,
        );
        if let Some(status) = filter.status {
            query = query.filter(commissions::status.eq(status.as_str()));
        }
        if let Some(key) = after {
            query = query.filter(
                commissions::created_at.lt(key.created_at).or(commissions::created_at
                    .eq(key.created_at)
                    .and(commissions::id.gt(key.id))),
            );
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CommissionRow> = query
            .order((commissions::created_at.desc(), commissions::id.asc()))
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_commission).collect()
    }

    async fn status_counts(
        &self,
        scope: &CommissionScope,
    ) -> Result<StatusCounts, CommissionRepositoryError> {
        let query = scoped(
            commissions::table.select(commissions::status).into_boxed(),
            scope,
        );
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let statuses: Vec<String> = query.load(&mut conn).await.map_err(map_diesel_error)?;

        statuses
            .iter()
            .try_fold(StatusCounts::default(), |mut counts, raw| {
                let status: CommissionStatus = raw
                    .parse()
                    .map_err(|err| CommissionRepositoryError::query(format!("{err}")))?;
                counts.record(status, 1);
                Ok(counts)
            })
    }

    async fn submit_bid(
        &self,
        bid: &Bid,
        expected_revision: u32,
    ) -> Result<(), CommissionRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let commission_id = bid.commission_id();
        let expected = revision_to_db(expected_revision)?;
        let next = revision_to_db(expected_revision.saturating_add(1))?;
        let terms = bid.terms();
        let row = NewBidRow {
            id: bid.id(),
            commission_id,
            artist_id: *bid.artist_id().as_uuid(),
            amount: amount_to_db(terms.amount.get(), "amount")?,
            estimated_days: terms
                .estimated_days
                .map(|days| i32::try_from(days.get()))
                .transpose()
                .map_err(|err| CommissionRepositoryError::query(err.to_string()))?,
            message: terms.message.as_ref().map(AsRef::as_ref),
            status: bid.status().as_str(),
            created_at: bid.created_at(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, TxError, _>(|conn| {
            async move {
                let bumped = diesel::update(
                    commissions::table
                        .filter(commissions::id.eq(commission_id))
                        .filter(commissions::revision.eq(expected))
                        .filter(commissions::status.eq(CommissionStatus::Open.as_str())),
                )
                .set((
                    commissions::revision.eq(next),
                    commissions::updated_at.eq(Utc::now()),
                ))
                .execute(conn)
                .await?;
                if bumped == 0 {
                    return Err(TxError::Repository(
                        CommissionRepositoryError::revision_mismatch(
                            commission_id,
                            expected_revision,
                        ),
                    ));
                }

                diesel::insert_into(bids::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                CommissionRepositoryError::duplicate_bid(commission_id, bid.artist_id().clone())
            } else {
                error.into_repository_error()
            }
        })
    }

    async fn find_bid(&self, id: Uuid) -> Result<Option<Bid>, CommissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = bids::table
            .find(id)
            .select(BidRow::as_select())
            .first::<BidRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_bid).transpose()
    }

    async fn list_bids(&self, commission_id: Uuid) -> Result<Vec<Bid>, CommissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BidRow> = bids::table
            .filter(bids::commission_id.eq(commission_id))
            .order((bids::amount.asc(), bids::created_at.asc(), bids::id.asc()))
            .select(BidRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_bid).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::{NaiveDate, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;

    fn commission_row() -> CommissionRow {
        let created_at = Utc
            .with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        CommissionRow {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            artist_id: Some(Uuid::new_v4()),
            title: "Banner art".to_owned(),
            description: "Twitch banner, 1200x480".to_owned(),
            category: Some("Illustration".to_owned()),
            budget_min: Some(2_000),
            budget_max: Some(4_000),
            deadline: NaiveDate::from_ymd_opt(2026, 7, 1),
            status: "in_progress".to_owned(),
            customer_consent: false,
            artist_consent: true,
            revision: 4,
            created_at,
        }
    }

    #[fixture]
    fn bid_row() -> BidRow {
        BidRow {
            id: Uuid::new_v4(),
            commission_id: Uuid::new_v4(),
            artist_id: Uuid::new_v4(),
            amount: 3_500,
            estimated_days: Some(5),
            message: None,
            status: "rejected".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn commission_rows_keep_consent_and_revision() {
        let commission = row_to_commission(commission_row()).expect("valid row");

        assert_eq!(commission.status(), CommissionStatus::InProgress);
        assert!(commission.consent().artist);
        assert_eq!(commission.revision(), 4);
        assert_eq!(commission.details().budget().max(), Some(4_000));
    }

    #[rstest]
    #[case::unknown_status(CommissionRow { status: "paused".to_owned(), ..commission_row() })]
    #[case::negative_revision(CommissionRow { revision: -1, ..commission_row() })]
    #[case::assigned_without_artist(CommissionRow { artist_id: None, ..commission_row() })]
    fn corrupt_commission_rows_are_query_errors(#[case] row: CommissionRow) {
        let err = row_to_commission(row).expect_err("row is corrupt");

        assert!(matches!(err, CommissionRepositoryError::Query { .. }));
    }

    #[rstest]
    fn bid_rows_convert(bid_row: BidRow) {
        let bid = row_to_bid(bid_row).expect("valid row");

        assert_eq!(bid.status(), BidStatus::Rejected);
        assert_eq!(bid.terms().estimated_days.map(|days| days.get()), Some(5));
    }

    #[rstest]
    fn non_positive_amounts_are_query_errors(bid_row: BidRow) {
        let err = row_to_bid(BidRow { amount: 0, ..bid_row }).expect_err("amount is zero");

        assert!(matches!(err, CommissionRepositoryError::Query { .. }));
    }

    #[rstest]
    fn unique_violations_are_recognised() {
        let violation = TxError::Diesel(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        ));
        let stale = TxError::Repository(CommissionRepositoryError::revision_mismatch(
            Uuid::nil(),
            3_u32,
        ));

        assert!(is_unique_violation(&violation));
        assert!(!is_unique_violation(&stale));
        assert!(matches!(
            stale.into_repository_error(),
            CommissionRepositoryError::RevisionMismatch { expected: 3, .. }
        ));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, CommissionRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }
}
