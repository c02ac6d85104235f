//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use commission_backend::domain::ServiceTimeouts;
use commission_backend::inbound::http::session_config::SessionSettings;
use commission_backend::outbound::notifier::{ConfiguredNotifier, LoggingLifecycleNotifier};
use commission_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) notifier: Arc<ConfiguredNotifier>,
    pub(crate) timeouts: ServiceTimeouts,
}

impl ServerConfig {
    /// In-memory storage, a logging notifier and default deadlines.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            notifier: Arc::new(ConfiguredNotifier::Logging(LoggingLifecycleNotifier)),
            timeouts: ServiceTimeouts::default(),
        }
    }

    /// Store profiles and commissions in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Deliver lifecycle events through `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: ConfiguredNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: ServiceTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
