//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BidCommand, BidQuery, CommissionCommand, CommissionQuery, ProfileCommand, ProfileQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub profiles: Arc<dyn ProfileCommand>,
    pub profiles_query: Arc<dyn ProfileQuery>,
    pub commissions: Arc<dyn CommissionCommand>,
    pub commissions_query: Arc<dyn CommissionQuery>,
    pub bids: Arc<dyn BidCommand>,
    pub bids_query: Arc<dyn BidQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub profiles: Arc<dyn ProfileCommand>,
    pub profiles_query: Arc<dyn ProfileQuery>,
    pub commissions: Arc<dyn CommissionCommand>,
    pub commissions_query: Arc<dyn CommissionQuery>,
    pub bids: Arc<dyn BidCommand>,
    pub bids_query: Arc<dyn BidQuery>,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            profiles,
            profiles_query,
            commissions,
            commissions_query,
            bids,
            bids_query,
        } = ports;
        Self {
            profiles,
            profiles_query,
            commissions,
            commissions_query,
            bids,
            bids_query,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
