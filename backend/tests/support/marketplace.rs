//! In-process marketplace wiring shared by the integration suites.

use std::sync::Arc;

use chrono::NaiveDate;
use commission_backend::domain::ports::{
    BidCommand, BidQuery, CommissionCommand, CommissionQuery, LifecycleNotifier, ProfileCommand,
    SignUpRequest,
};
use commission_backend::domain::{
    BidService, CommissionDetailsDraft, CommissionLocks, CommissionService, MarketplaceContext,
    ProfileService, Role, ServiceTimeouts, UserId,
};
use commission_backend::outbound::memory::InMemoryMarketplace;
use commission_backend::outbound::notifier::LoggingLifecycleNotifier;
use mockable::DefaultClock;

/// Driving ports over one in-memory store.
#[derive(Clone)]
pub struct Marketplace {
    pub profiles: Arc<dyn ProfileCommand>,
    pub commissions: Arc<dyn CommissionCommand>,
    pub commissions_query: Arc<dyn CommissionQuery>,
    pub bids: Arc<dyn BidCommand>,
    pub bids_query: Arc<dyn BidQuery>,
}

impl Marketplace {
    pub fn in_memory() -> Self {
        Self::with_notifier(Arc::new(LoggingLifecycleNotifier), ServiceTimeouts::default())
    }

    /// In-memory store announcing lifecycle events through `notifier`.
    pub fn with_notifier<N>(notifier: Arc<N>, timeouts: ServiceTimeouts) -> Self
    where
        N: LifecycleNotifier + 'static,
    {
        let store = Arc::new(InMemoryMarketplace::new());
        let context = MarketplaceContext::new(
            Arc::clone(&store),
            Arc::clone(&store),
            notifier,
            Arc::new(CommissionLocks::new()),
            Arc::new(DefaultClock),
            timeouts,
        );
        let commissions = Arc::new(CommissionService::new(context.clone()));
        let bids = Arc::new(BidService::new(context));
        Self {
            profiles: Arc::new(ProfileService::new(store, Arc::new(DefaultClock), timeouts)),
            commissions: commissions.clone(),
            commissions_query: commissions,
            bids: bids.clone(),
            bids_query: bids,
        }
    }

    pub async fn sign_up(&self, display_name: &str, role: Role) -> UserId {
        self.profiles
            .sign_up(SignUpRequest {
                display_name: display_name.to_owned(),
                role,
                bio: None,
            })
            .await
            .expect("sign up succeeds")
            .id()
            .clone()
    }
}

/// A valid brief due far in the future.
pub fn brief(title: &str) -> CommissionDetailsDraft {
    CommissionDetailsDraft {
        title: title.to_owned(),
        description: "Oil on canvas, 40x50".to_owned(),
        category: Some("Portrait".to_owned()),
        budget_min: Some(4_000),
        budget_max: Some(9_000),
        deadline: NaiveDate::from_ymd_opt(2099, 12, 31),
    }
}
