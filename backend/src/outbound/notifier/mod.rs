//! Lifecycle notifier adapters.
//!
//! [`HttpLifecycleNotifier`] posts to the checkout webhook.
//! [`LoggingLifecycleNotifier`] stands in when no webhook is configured.

mod http;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{LifecycleEvent, LifecycleNotifier, LifecycleNotifierError};

pub use http::HttpLifecycleNotifier;

/// Notifier that records every event in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingLifecycleNotifier;

#[async_trait]
impl LifecycleNotifier for LoggingLifecycleNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), LifecycleNotifierError> {
        let payload = serde_json::to_string(event)
            .map_err(|err| LifecycleNotifierError::transport(err.to_string()))?;
        info!(
            commission_id = %event.commission_id(),
            event = event.kind(),
            %payload,
            "lifecycle event"
        );
        Ok(())
    }
}

/// Either configured notifier behind one concrete type.
pub enum ConfiguredNotifier {
    Http(HttpLifecycleNotifier),
    Logging(LoggingLifecycleNotifier),
}

#[async_trait]
impl LifecycleNotifier for ConfiguredNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), LifecycleNotifierError> {
        match self {
            Self::Http(notifier) => notifier.notify(event).await,
            Self::Logging(notifier) => notifier.notify(event).await,
        }
    }
}
