//! Behaviour of the in-process store's atomic checks.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{
    Actor, BidTerms, CommissionDetails, CommissionDetailsDraft, DisplayName, Role, plan_transition,
    settle_bids,
};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

fn commission(customer: &UserId, posted: i64) -> Commission {
    let details = CommissionDetails::new(
        CommissionDetailsDraft {
            title: "Koi pond mural".to_owned(),
            description: "Wall mural, 3m wide".to_owned(),
            ..CommissionDetailsDraft::default()
        },
        NaiveDate::MIN,
    )
    .expect("valid details");
    Commission::open(Uuid::new_v4(), customer.clone(), details, at(posted))
}

fn bid(commission: &Commission, artist: &UserId, amount: i64) -> Bid {
    Bid::pending(
        Uuid::new_v4(),
        commission.id(),
        artist.clone(),
        BidTerms::new(amount, None, None).expect("valid terms"),
        at(1),
    )
}

#[fixture]
fn store() -> InMemoryMarketplace {
    InMemoryMarketplace::new()
}

#[rstest]
#[tokio::test]
async fn bids_bump_the_commission_revision(store: InMemoryMarketplace) {
    let customer = UserId::random();
    let posted = commission(&customer, 0);
    store.insert_commission(&posted).await.expect("insert");

    store
        .submit_bid(&bid(&posted, &UserId::random(), 900), 0)
        .await
        .expect("first bid");
    let stale = store
        .submit_bid(&bid(&posted, &UserId::random(), 800), 0)
        .await
        .expect_err("revision moved on");

    assert!(matches!(
        stale,
        CommissionRepositoryError::RevisionMismatch { expected: 0, .. }
    ));
    let stored = store
        .find_commission(posted.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.revision(), 1);
}

#[rstest]
#[tokio::test]
async fn one_active_bid_per_artist(store: InMemoryMarketplace) {
    let artist = UserId::random();
    let posted = commission(&UserId::random(), 0);
    store.insert_commission(&posted).await.expect("insert");
    store
        .submit_bid(&bid(&posted, &artist, 900), 0)
        .await
        .expect("first bid");

    let err = store
        .submit_bid(&bid(&posted, &artist, 700), 1)
        .await
        .expect_err("second bid from same artist");

    assert_eq!(
        err,
        CommissionRepositoryError::duplicate_bid(posted.id(), artist)
    );
    assert_eq!(store.list_bids(posted.id()).await.expect("bids").len(), 1);
}

#[rstest]
#[tokio::test]
async fn settled_commits_land_together_and_only_once(store: InMemoryMarketplace) {
    let customer = UserId::random();
    let posted = commission(&customer, 0);
    store.insert_commission(&posted).await.expect("insert");
    let high = bid(&posted, &UserId::random(), 9_000);
    let low = bid(&posted, &UserId::random(), 6_000);
    store.submit_bid(&high, 0).await.expect("high bid");
    store.submit_bid(&low, 1).await.expect("low bid");

    let current = store
        .find_commission(posted.id())
        .await
        .expect("lookup")
        .expect("present");
    let bids = store.list_bids(posted.id()).await.expect("bids");
    assert_eq!(bids.first().map(Bid::id), Some(low.id()));

    let settlement = settle_bids(&current, &low, bids).expect("open commission");
    let mut changed = vec![settlement.accepted.clone()];
    changed.extend(settlement.rejected);
    let commit = CommissionCommit {
        commission: settlement.commission,
        expected_revision: current.revision(),
        bids: changed,
    };
    store.commit(&commit).await.expect("first accept wins");
    let replay = store.commit(&commit).await.expect_err("second accept loses");

    assert!(matches!(
        replay,
        CommissionRepositoryError::RevisionMismatch { .. }
    ));
    let statuses: Vec<BidStatus> = store
        .list_bids(posted.id())
        .await
        .expect("bids")
        .iter()
        .map(Bid::status)
        .collect();
    assert_eq!(statuses, vec![BidStatus::Accepted, BidStatus::Rejected]);
}

#[rstest]
#[tokio::test]
async fn assigned_commissions_take_no_bids(store: InMemoryMarketplace) {
    let posted = commission(&UserId::random(), 0);
    store.insert_commission(&posted).await.expect("insert");
    let winning = bid(&posted, &UserId::random(), 5_000);
    store.submit_bid(&winning, 0).await.expect("bid");
    let current = store
        .find_commission(posted.id())
        .await
        .expect("lookup")
        .expect("present");
    let settlement = settle_bids(&current, &winning, vec![winning.clone()]).expect("settles");
    store
        .commit(&CommissionCommit {
            commission: settlement.commission,
            expected_revision: 1,
            bids: vec![settlement.accepted],
        })
        .await
        .expect("assign");

    let late = store
        .submit_bid(&bid(&posted, &UserId::random(), 4_000), 2)
        .await
        .expect_err("no longer open");

    assert!(matches!(
        late,
        CommissionRepositoryError::RevisionMismatch { expected: 2, .. }
    ));
}

#[rstest]
#[tokio::test]
async fn commits_with_foreign_bids_change_nothing(store: InMemoryMarketplace) {
    let customer = UserId::random();
    let posted = commission(&customer, 0);
    let other = commission(&customer, 1);
    store.insert_commission(&posted).await.expect("insert");
    store.insert_commission(&other).await.expect("insert");
    let cancelled = plan_transition(
        &posted,
        CommissionStatus::Cancelled,
        &Actor::customer(customer.clone()),
    )
    .expect("owner cancels")
    .into_commission();

    let err = store
        .commit(&CommissionCommit {
            commission: cancelled,
            expected_revision: 0,
            bids: vec![bid(&other, &UserId::random(), 100)],
        })
        .await
        .expect_err("bid belongs elsewhere");

    assert!(matches!(err, CommissionRepositoryError::Query { .. }));
    let stored = store
        .find_commission(posted.id())
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.status(), CommissionStatus::Open);
}

#[rstest]
#[tokio::test]
async fn listings_run_newest_first_after_the_cursor(store: InMemoryMarketplace) {
    let customer = UserId::random();
    let mut posted: Vec<Commission> = (0..4).map(|minute| commission(&customer, minute)).collect();
    for commission in &posted {
        store.insert_commission(commission).await.expect("insert");
    }
    store
        .insert_commission(&commission(&UserId::random(), 9))
        .await
        .expect("foreign insert");
    posted.reverse();

    let filter = CommissionFilter {
        scope: CommissionScope::Customer(customer.clone()),
        status: None,
    };
    let first = store
        .list_commissions(&filter, None, 2)
        .await
        .expect("first page");
    let after = first.last().map(CommissionCursorKey::of);
    let second = store
        .list_commissions(&filter, after, 2)
        .await
        .expect("second page");

    let ids: Vec<Uuid> = first.iter().chain(&second).map(Commission::id).collect();
    let expected: Vec<Uuid> = posted.iter().map(Commission::id).collect();
    assert_eq!(ids, expected);

    let counts = store
        .status_counts(&CommissionScope::Customer(customer))
        .await
        .expect("counts");
    assert_eq!((counts.total, counts.open), (4, 4));
}

#[rstest]
#[tokio::test]
async fn profile_updates_keep_the_stored_role(store: InMemoryMarketplace) {
    let id = UserId::random();
    let artist = Profile::new(
        id.clone(),
        Role::Artist,
        DisplayName::new("Inkwell").expect("valid name"),
        None,
        at(0),
    );
    store.insert(&artist).await.expect("insert");
    let renamed = Profile::new(
        id.clone(),
        Role::Customer,
        DisplayName::new("Inkwell Studio").expect("valid name"),
        None,
        at(0),
    );
    store.update(&renamed).await.expect("update");

    let stored = store.find_by_id(&id).await.expect("lookup").expect("present");
    assert_eq!(stored.role(), Role::Artist);
    assert_eq!(stored.display_name().as_ref(), "Inkwell Studio");
    assert!(store.insert(&artist).await.is_err());
}
