//! Shared fixtures for service unit tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use uuid::Uuid;

use crate::domain::ports::{LifecycleEvent, LifecycleNotifierError, MockLifecycleNotifier};
use crate::domain::service_support::ServiceTimeouts;
use crate::domain::{
    Actor, Bid, BidTerms, Commission, CommissionDetails, CommissionDetailsDraft, DisplayName,
    Profile, Role, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_today() -> NaiveDate {
    fixture_timestamp().date_naive()
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn short_timeouts() -> ServiceTimeouts {
    ServiceTimeouts {
        repository: Duration::from_millis(200),
        notifier: Duration::from_millis(200),
    }
}

pub(crate) fn profile(id: &UserId, role: Role) -> Profile {
    Profile::new(
        id.clone(),
        role,
        DisplayName::new(match role {
            Role::Customer => "Patron",
            Role::Artist => "Painter",
        })
        .expect("valid display name"),
        None,
        fixture_timestamp(),
    )
}

pub(crate) fn details_draft() -> CommissionDetailsDraft {
    CommissionDetailsDraft {
        title: "Dragon portrait".to_owned(),
        description: "A red dragon perched on a cliff at dusk".to_owned(),
        category: Some("Fantasy Art".to_owned()),
        budget_min: Some(5_000),
        budget_max: Some(20_000),
        deadline: None,
    }
}

pub(crate) fn open_commission(customer: &UserId) -> Commission {
    let details = CommissionDetails::new(details_draft(), fixture_today()).expect("valid details");
    Commission::open(Uuid::new_v4(), customer.clone(), details, fixture_timestamp())
}

pub(crate) fn pending_bid(commission: &Commission, artist: &UserId, amount: i64) -> Bid {
    Bid::pending(
        Uuid::new_v4(),
        commission.id(),
        artist.clone(),
        BidTerms::new(amount, Some(10), None).expect("valid terms"),
        fixture_timestamp(),
    )
}

/// Commission assigned to `artist` through a settled bid, plus that bid.
pub(crate) fn assigned_commission(customer: &UserId, artist: &UserId) -> (Commission, Bid) {
    let commission = open_commission(customer);
    let bid = pending_bid(&commission, artist, 6_000);
    let settlement = crate::domain::settle_bids(&commission, &bid, vec![bid.clone()])
        .expect("open commission settles");
    (settlement.commission, settlement.accepted)
}

pub(crate) fn actor_for(id: &UserId, role: Role) -> Actor {
    Actor {
        user_id: id.clone(),
        role,
    }
}

/// Notifier expecting `calls` deliveries, each answered with `outcome`.
///
/// Delivery runs on a background task, so tests read the events back from
/// the returned receiver.
pub(crate) fn echoing_notifier(
    calls: usize,
    outcome: fn() -> Result<(), LifecycleNotifierError>,
) -> (MockLifecycleNotifier, UnboundedReceiver<LifecycleEvent>) {
    let (sent, delivered) = unbounded_channel();
    let mut notifier = MockLifecycleNotifier::new();
    notifier.expect_notify().times(calls).returning(move |event| {
        sent.send(event.clone()).expect("test holds the receiver");
        outcome()
    });
    (notifier, delivered)
}

pub(crate) async fn next_delivery(delivered: &mut UnboundedReceiver<LifecycleEvent>) -> LifecycleEvent {
    tokio::time::timeout(Duration::from_secs(1), delivered.recv())
        .await
        .expect("event delivered in time")
        .expect("notifier still alive")
}
