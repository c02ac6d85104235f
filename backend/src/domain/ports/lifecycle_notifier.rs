//! Driven port announcing committed lifecycle changes to the checkout service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CommissionStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Delivery failures reported by notifier adapters.
    pub enum LifecycleNotifierError {
        /// The request could not be sent or the connection failed.
        Transport { message: String } => "lifecycle notification transport failed: {message}",
        /// The receiver answered with a non-success status.
        Rejected { status: u16 } => "lifecycle notification rejected with status {status}",
        /// The receiver did not answer in time.
        Timeout => "lifecycle notification timed out",
    }
}

/// Event emitted after a lifecycle change has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A customer accepted a bid; checkout should collect `amount`.
    #[serde(rename_all = "camelCase")]
    BidAccepted {
        commission_id: Uuid,
        bid_id: Uuid,
        artist_id: UserId,
        customer_id: UserId,
        amount: u64,
    },
    /// The commission moved between two statuses.
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        commission_id: Uuid,
        from: CommissionStatus,
        to: CommissionStatus,
    },
}

impl LifecycleEvent {
    pub fn commission_id(&self) -> Uuid {
        match self {
            Self::BidAccepted { commission_id, .. } | Self::StatusChanged { commission_id, .. } => {
                *commission_id
            }
        }
    }

    /// Short event name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BidAccepted { .. } => "bid_accepted",
            Self::StatusChanged { .. } => "status_changed",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LifecycleNotifier: Send + Sync {
    /// Deliver an event. Callers log failures and carry on.
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), LifecycleNotifierError>;
}

/// Notifier that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLifecycleNotifier;

#[async_trait]
impl LifecycleNotifier for FixtureLifecycleNotifier {
    async fn notify(&self, _event: &LifecycleEvent) -> Result<(), LifecycleNotifierError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn events_serialise_with_a_type_tag() {
        let event = LifecycleEvent::StatusChanged {
            commission_id: Uuid::nil(),
            from: CommissionStatus::Assigned,
            to: CommissionStatus::InProgress,
        };

        let value = serde_json::to_value(&event).expect("serialises");

        assert_eq!(
            value,
            json!({
                "type": "status_changed",
                "commissionId": Uuid::nil(),
                "from": "assigned",
                "to": "in_progress",
            })
        );
        assert_eq!(event.kind(), "status_changed");
    }
}
