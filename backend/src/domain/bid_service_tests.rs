//! Tests for the bid service.

use std::collections::HashMap;
use std::sync::Arc;

use mockall::Sequence;
use rstest::rstest;

use super::*;
use crate::domain::commission_locks::CommissionLocks;
use crate::domain::ports::{
    CommissionRepositoryError, LifecycleNotifierError, MockCommissionRepository,
    MockLifecycleNotifier, MockProfileRepository,
};
use crate::domain::service_test_helpers::{
    assigned_commission, echoing_notifier, fixture_clock, next_delivery, open_commission,
    pending_bid, profile, short_timeouts,
};
use crate::domain::{ErrorCode, MarketplaceContext, Profile};

type Service = BidService<MockCommissionRepository, MockProfileRepository, MockLifecycleNotifier>;

fn profiles(members: &[(&UserId, Role)]) -> MockProfileRepository {
    let known: HashMap<UserId, Profile> = members
        .iter()
        .map(|(id, role)| ((*id).clone(), profile(id, *role)))
        .collect();
    let mut repo = MockProfileRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(known.get(id).cloned()));
    repo
}

fn service(
    repo: MockCommissionRepository,
    profiles: MockProfileRepository,
    notifier: MockLifecycleNotifier,
) -> Service {
    BidService::new(MarketplaceContext::new(
        Arc::new(repo),
        Arc::new(profiles),
        Arc::new(notifier),
        Arc::new(CommissionLocks::new()),
        fixture_clock(),
        short_timeouts(),
    ))
}

fn silent_notifier() -> MockLifecycleNotifier {
    let mut notifier = MockLifecycleNotifier::new();
    notifier.expect_notify().times(0);
    notifier
}

fn offer(amount: i64) -> SubmitBidRequest {
    SubmitBidRequest {
        amount,
        estimated_days: Some(7),
        message: Some("Happy to take this on".to_owned()),
    }
}

#[tokio::test]
async fn artists_bid_on_open_commissions() {
    let customer = UserId::random();
    let artist = UserId::random();
    let commission = open_commission(&customer);
    let id = commission.id();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_submit_bid()
        .times(1)
        .withf(move |bid, expected| {
            bid.commission_id() == id && bid.status() == BidStatus::Pending && *expected == 0
        })
        .return_once(|_, _| Ok(()));

    let bid = service(repo, profiles(&[(&artist, Role::Artist)]), silent_notifier())
        .submit_bid(&artist, id, offer(8_000))
        .await
        .expect("artist may bid");

    assert_eq!(bid.artist_id(), &artist);
    assert_eq!(bid.amount().get(), 8_000);
}

#[tokio::test]
async fn customers_cannot_bid() {
    let customer = UserId::random();
    let mut repo = MockCommissionRepository::new();
    repo.expect_submit_bid().times(0);

    let error = service(
        repo,
        profiles(&[(&customer, Role::Customer)]),
        silent_notifier(),
    )
    .submit_bid(&customer, Uuid::new_v4(), offer(8_000))
    .await
    .expect_err("customers hold the wrong role");

    assert_eq!(error.detail_code(), Some("role_required"));
}

#[rstest]
#[case::zero_amount(SubmitBidRequest { amount: 0, ..offer(1) }, "amount")]
#[case::zero_days(SubmitBidRequest { estimated_days: Some(0), ..offer(1) }, "estimatedDays")]
#[tokio::test]
async fn malformed_offers_name_their_field(#[case] request: SubmitBidRequest, #[case] field: &str) {
    let artist = UserId::random();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_commission().times(0);
    repo.expect_submit_bid().times(0);

    let error = service(repo, profiles(&[(&artist, Role::Artist)]), silent_notifier())
        .submit_bid(&artist, Uuid::new_v4(), request)
        .await
        .expect_err("offer is malformed");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().map(|d| d["field"].clone()),
        Some(serde_json::json!(field))
    );
}

#[tokio::test]
async fn assigned_commissions_refuse_new_bids() {
    let artist = UserId::random();
    let (commission, _) = assigned_commission(&UserId::random(), &UserId::random());
    let id = commission.id();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_submit_bid().times(0);

    let error = service(repo, profiles(&[(&artist, Role::Artist)]), silent_notifier())
        .submit_bid(&artist, id, offer(8_000))
        .await
        .expect_err("commission is closed to bids");

    assert_eq!(error.detail_code(), Some("invalid_state"));
}

#[tokio::test]
async fn second_bids_from_one_artist_conflict() {
    let artist = UserId::random();
    let commission = open_commission(&UserId::random());
    let id = commission.id();
    let duplicate_artist = artist.clone();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_submit_bid().return_once(move |_, _| {
        Err(CommissionRepositoryError::duplicate_bid(id, duplicate_artist))
    });

    let error = service(repo, profiles(&[(&artist, Role::Artist)]), silent_notifier())
        .submit_bid(&artist, id, offer(8_000))
        .await
        .expect_err("one bid per artist");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.detail_code(), Some("duplicate_bid"));
}

#[tokio::test]
async fn accepting_settles_the_ledger_and_notifies_twice() {
    let customer = UserId::random();
    let winner = UserId::random();
    let loser = UserId::random();
    let commission = open_commission(&customer);
    let winning = pending_bid(&commission, &winner, 7_000);
    let losing = pending_bid(&commission, &loser, 6_000);
    let winning_id = winning.id();
    let found = winning.clone();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_bid().return_once(move |_| Ok(Some(found)));
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_list_bids()
        .return_once(move |_| Ok(vec![losing, winning]));
    repo.expect_commit()
        .times(1)
        .withf(move |commit| {
            commit.expected_revision == 0
                && commit.commission.status() == CommissionStatus::Assigned
                && commit.bids.len() == 2
                && commit.bids.iter().all(|bid| {
                    (bid.id() == winning_id) == (bid.status() == BidStatus::Accepted)
                })
        })
        .return_once(|_| Ok(()));
    let (notifier, mut delivered) = echoing_notifier(2, || Ok(()));

    let response = service(
        repo,
        profiles(&[(&customer, Role::Customer)]),
        notifier,
    )
    .accept_bid(&customer, winning_id)
    .await
    .expect("owner accepts");

    assert_eq!(response.bid.status(), BidStatus::Accepted);
    assert!(response.commission.is_assigned_to(&winner));
    assert!(matches!(
        next_delivery(&mut delivered).await,
        LifecycleEvent::BidAccepted { amount: 7_000, .. }
    ));
    assert!(matches!(
        next_delivery(&mut delivered).await,
        LifecycleEvent::StatusChanged {
            to: CommissionStatus::Assigned,
            ..
        }
    ));
}

#[tokio::test]
async fn notifier_failures_do_not_undo_an_acceptance() {
    let customer = UserId::random();
    let artist = UserId::random();
    let commission = open_commission(&customer);
    let bid = pending_bid(&commission, &artist, 7_000);
    let bid_id = bid.id();
    let listed = bid.clone();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_bid().return_once(move |_| Ok(Some(bid)));
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_list_bids()
        .return_once(move |_| Ok(vec![listed]));
    repo.expect_commit().times(1).return_once(|_| Ok(()));
    let (notifier, mut delivered) =
        echoing_notifier(2, || Err(LifecycleNotifierError::rejected(503_u16)));

    let response = service(repo, profiles(&[(&customer, Role::Customer)]), notifier)
        .accept_bid(&customer, bid_id)
        .await
        .expect("acceptance stands");

    assert_eq!(response.commission.status(), CommissionStatus::Assigned);
    next_delivery(&mut delivered).await;
    next_delivery(&mut delivered).await;
}

#[tokio::test]
async fn repeated_accepts_return_the_settled_state_quietly() {
    let customer = UserId::random();
    let (commission, accepted) = assigned_commission(&customer, &UserId::random());
    let bid_id = accepted.id();
    let found = accepted.clone();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_bid().return_once(move |_| Ok(Some(found)));
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_list_bids()
        .return_once(move |_| Ok(vec![accepted]));
    repo.expect_commit().times(0);

    let response = service(
        repo,
        profiles(&[(&customer, Role::Customer)]),
        silent_notifier(),
    )
    .accept_bid(&customer, bid_id)
    .await
    .expect("idempotent accept");

    assert_eq!(response.bid.id(), bid_id);
    assert_eq!(response.commission.status(), CommissionStatus::Assigned);
}

#[tokio::test]
async fn only_the_owner_may_accept() {
    let customer = UserId::random();
    let intruder = UserId::random();
    let commission = open_commission(&customer);
    let bid = pending_bid(&commission, &UserId::random(), 7_000);
    let bid_id = bid.id();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_bid().return_once(move |_| Ok(Some(bid)));
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_commit().times(0);

    let error = service(
        repo,
        profiles(&[(&customer, Role::Customer), (&intruder, Role::Customer)]),
        silent_notifier(),
    )
    .accept_bid(&intruder, bid_id)
    .await
    .expect_err("not the owner");

    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.detail_code(), Some("permission_denied"));
}

#[tokio::test]
async fn accepting_a_rejected_bid_is_a_state_error() {
    let customer = UserId::random();
    let (commission, accepted) = assigned_commission(&customer, &UserId::random());
    let late = pending_bid(&commission, &UserId::random(), 4_000).with_status(BidStatus::Rejected);
    let late_id = late.id();
    let found = late.clone();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_bid().return_once(move |_| Ok(Some(found)));
    repo.expect_find_commission()
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_list_bids()
        .return_once(move |_| Ok(vec![accepted, late]));
    repo.expect_commit().times(0);

    let error = service(
        repo,
        profiles(&[(&customer, Role::Customer)]),
        silent_notifier(),
    )
    .accept_bid(&customer, late_id)
    .await
    .expect_err("commission already assigned");

    assert_eq!(error.detail_code(), Some("invalid_state"));
}

#[rstest]
#[case::won_by_another_bid(BidStatus::Pending, false)]
#[case::won_by_the_same_bid(BidStatus::Accepted, true)]
#[tokio::test]
async fn lost_revision_races_report_the_settled_outcome(
    #[case] status_after_race: BidStatus,
    #[case] succeeds: bool,
) {
    let customer = UserId::random();
    let commission = open_commission(&customer);
    let bid = pending_bid(&commission, &UserId::random(), 7_000);
    let bid_id = bid.id();
    let commission_id = commission.id();
    let after_race = bid.clone().with_status(status_after_race);
    let listed = bid.clone();
    let reloaded = commission.clone();
    let mut seq = Sequence::new();
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_bid()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(bid)));
    repo.expect_find_commission()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(commission)));
    repo.expect_list_bids()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(vec![listed]));
    repo.expect_commit()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Err(CommissionRepositoryError::revision_mismatch(commission_id, 0_u32)));
    repo.expect_find_bid()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(Some(after_race)));
    if succeeds {
        repo.expect_find_commission()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(move |_| Ok(Some(reloaded)));
    }

    let result = service(
        repo,
        profiles(&[(&customer, Role::Customer)]),
        silent_notifier(),
    )
    .accept_bid(&customer, bid_id)
    .await;

    match result {
        Ok(response) => {
            assert!(succeeds, "race against another bid must fail");
            assert_eq!(response.bid.status(), BidStatus::Accepted);
        }
        Err(error) => {
            assert!(!succeeds, "race won by the same bid must succeed");
            assert_eq!(error.detail_code(), Some("invalid_state"));
        }
    }
}

#[tokio::test]
async fn bid_visibility_follows_the_party() {
    let customer = UserId::random();
    let other_customer = UserId::random();
    let first = UserId::random();
    let second = UserId::random();
    let commission = open_commission(&customer);
    let id = commission.id();
    let bids = vec![
        pending_bid(&commission, &first, 5_000),
        pending_bid(&commission, &second, 6_000),
    ];
    let mut repo = MockCommissionRepository::new();
    repo.expect_find_commission()
        .returning(move |_| Ok(Some(commission.clone())));
    repo.expect_list_bids()
        .returning(move |_| Ok(bids.clone()));
    let service = service(
        repo,
        profiles(&[
            (&customer, Role::Customer),
            (&other_customer, Role::Customer),
            (&first, Role::Artist),
            (&second, Role::Artist),
        ]),
        silent_notifier(),
    );

    let owner_view = service.list_bids(&customer, id).await.expect("owner view");
    assert_eq!(owner_view.len(), 2);

    let artist_view = service.list_bids(&second, id).await.expect("artist view");
    assert_eq!(artist_view.len(), 1);
    assert!(artist_view.iter().all(|bid| bid.artist_id() == &second));

    let error = service
        .list_bids(&other_customer, id)
        .await
        .expect_err("foreign customer");
    assert_eq!(error.detail_code(), Some("permission_denied"));
}
