//! Lifecycle notifications leave the request path.
//!
//! A slow checkout endpoint delays delivery, never the mutation that
//! produced the event.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use commission_backend::domain::ports::{
    LifecycleEvent, LifecycleNotifier, LifecycleNotifierError, SubmitBidRequest,
};
use commission_backend::domain::{CommissionStatus, Role, ServiceTimeouts};
use rstest::rstest;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

#[allow(dead_code)]
#[path = "support/marketplace.rs"]
mod marketplace;

use marketplace::{Marketplace, brief};

const NOTIFIER_DELAY: Duration = Duration::from_secs(2);
const REQUEST_BOUND: Duration = Duration::from_millis(500);

/// Notifier that stalls before reporting each event.
struct SlowNotifier {
    delay: Duration,
    delivered: UnboundedSender<LifecycleEvent>,
}

#[async_trait]
impl LifecycleNotifier for SlowNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), LifecycleNotifierError> {
        tokio::time::sleep(self.delay).await;
        let _ = self.delivered.send(event.clone());
        Ok(())
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_notifier_does_not_hold_up_acceptance() {
    let (delivered, mut deliveries) = unbounded_channel();
    let notifier = Arc::new(SlowNotifier {
        delay: NOTIFIER_DELAY,
        delivered,
    });
    let market = Marketplace::with_notifier(
        notifier,
        ServiceTimeouts {
            notifier: NOTIFIER_DELAY * 4,
            ..ServiceTimeouts::default()
        },
    );
    let customer = market.sign_up("Carol Customer", Role::Customer).await;
    let artist = market.sign_up("Arty Artist", Role::Artist).await;
    let commission = market
        .commissions
        .create_commission(&customer, brief("Portrait of Rex"))
        .await
        .expect("commission created");
    let bid = market
        .bids
        .submit_bid(
            &artist,
            commission.id(),
            SubmitBidRequest {
                amount: 7_000,
                estimated_days: Some(10),
                message: None,
            },
        )
        .await
        .expect("bid placed");

    let started = Instant::now();
    let accepted = market
        .bids
        .accept_bid(&customer, bid.id())
        .await
        .expect("accept succeeds");
    let elapsed = started.elapsed();

    assert!(
        elapsed < REQUEST_BOUND,
        "accept waited {elapsed:?} on the notifier"
    );
    assert_eq!(accepted.commission.status(), CommissionStatus::Assigned);

    let first = tokio::time::timeout(NOTIFIER_DELAY * 3, deliveries.recv())
        .await
        .expect("event delivered in the background")
        .expect("notifier still attached");
    assert_eq!(first.kind(), "bid_accepted");
    assert_eq!(first.commission_id(), commission.id());
}
