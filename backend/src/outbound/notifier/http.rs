//! Reqwest-backed checkout webhook.
//!
//! Each event is POSTed as JSON to one endpoint. The client-level timeout
//! bounds the whole exchange.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{LifecycleEvent, LifecycleNotifier, LifecycleNotifierError};

const USER_AGENT: &str = "commission-backend-notifier/0.1";

/// Notifier that delivers lifecycle events to a checkout webhook.
pub struct HttpLifecycleNotifier {
    client: Client,
    endpoint: Url,
}

impl HttpLifecycleNotifier {
    /// Build a notifier whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl LifecycleNotifier for HttpLifecycleNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), LifecycleNotifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!(
            commission_id = %event.commission_id(),
            event = event.kind(),
            status = status.as_u16(),
            "checkout webhook answered"
        );
        map_status(status)
    }
}

fn map_transport_error(error: reqwest::Error) -> LifecycleNotifierError {
    if error.is_timeout() {
        LifecycleNotifierError::timeout()
    } else {
        LifecycleNotifierError::transport(error.to_string())
    }
}

fn map_status(status: StatusCode) -> Result<(), LifecycleNotifierError> {
    match status {
        _ if status.is_success() => Ok(()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            Err(LifecycleNotifierError::timeout())
        }
        _ => Err(LifecycleNotifierError::rejected(status.as_u16())),
    }
}
