//! Builders wiring repositories and services into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use commission_backend::domain::ports::{
    CommissionRepository, LifecycleNotifier, ProfileRepository,
};
use commission_backend::domain::{
    BidService, CommissionLocks, CommissionService, MarketplaceContext, ProfileService,
    ServiceTimeouts,
};
use commission_backend::inbound::http::state::{HttpState, HttpStatePorts};
use commission_backend::outbound::memory::InMemoryMarketplace;
use commission_backend::outbound::persistence::{
    DieselCommissionRepository, DieselProfileRepository,
};

use super::ServerConfig;

/// Services over one pair of repositories.
///
/// Commission and bid services share a lock registry so every mutation of a
/// commission is serialized within this process.
fn marketplace_ports<R, P, N>(
    commissions: Arc<R>,
    profiles: Arc<P>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    timeouts: ServiceTimeouts,
) -> HttpStatePorts
where
    R: CommissionRepository + 'static,
    P: ProfileRepository + 'static,
    N: LifecycleNotifier + 'static,
{
    let context = MarketplaceContext::new(
        commissions,
        Arc::clone(&profiles),
        notifier,
        Arc::new(CommissionLocks::new()),
        Arc::clone(&clock),
        timeouts,
    );
    let profile_service = Arc::new(ProfileService::new(profiles, clock, timeouts));
    let commission_service = Arc::new(CommissionService::new(context.clone()));
    let bid_service = Arc::new(BidService::new(context));
    HttpStatePorts {
        profiles: profile_service.clone(),
        profiles_query: profile_service,
        commissions: commission_service.clone(),
        commissions_query: commission_service,
        bids: bid_service.clone(),
        bids_query: bid_service,
    }
}

fn build_ports(config: &ServerConfig, clock: Arc<dyn Clock>) -> HttpStatePorts {
    let notifier = Arc::clone(&config.notifier);
    match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            marketplace_ports(
                Arc::new(DieselCommissionRepository::new(pool.clone())),
                Arc::new(DieselProfileRepository::new(pool.clone())),
                notifier,
                clock,
                config.timeouts,
            )
        }
        None => {
            info!("no database configured; using the in-process store");
            let store = Arc::new(InMemoryMarketplace::new());
            marketplace_ports(
                Arc::clone(&store),
                store,
                notifier,
                clock,
                config.timeouts,
            )
        }
    }
}

pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(build_ports(config, Arc::new(DefaultClock))))
}
