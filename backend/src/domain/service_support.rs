//! Internal helpers shared by the marketplace services.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::ports::{
    CommissionRepositoryError, LifecycleEvent, LifecycleNotifier, ProfileRepository,
    ProfileRepositoryError,
};
use crate::domain::{Actor, Error, TraceId, UserId};

/// Default deadline for repository calls.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Default deadline for notifier calls.
pub const DEFAULT_NOTIFIER_TIMEOUT: Duration = Duration::from_secs(3);

/// Deadlines applied to outbound calls made by services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeouts {
    pub repository: Duration,
    pub notifier: Duration,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self {
            repository: DEFAULT_OPERATION_TIMEOUT,
            notifier: DEFAULT_NOTIFIER_TIMEOUT,
        }
    }
}

pub(crate) fn map_commission_repository_error(error: CommissionRepositoryError) -> Error {
    match error {
        CommissionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("commission repository unavailable: {message}"))
        }
        CommissionRepositoryError::Query { message } => {
            Error::internal(format!("commission repository error: {message}"))
        }
        CommissionRepositoryError::RevisionMismatch { commission_id, .. } => Error::invalid_state(
            format!("commission {commission_id} changed concurrently; reload and retry"),
        ),
        CommissionRepositoryError::DuplicateBid { commission_id, .. } => Error::conflict(format!(
            "you already have an active bid on commission {commission_id}"
        ))
        .with_details(json!({ "code": "duplicate_bid", "commissionId": commission_id })),
    }
}

pub(crate) fn map_profile_repository_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
    }
}

/// Validation failure naming the offending wire field.
pub(crate) fn invalid_field(field: Option<&str>, error: impl std::fmt::Display) -> Error {
    let details = match field {
        Some(field) => json!({ "code": "validation_failed", "field": field }),
        None => json!({ "code": "validation_failed" }),
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

/// Await a repository call, mapping both its error and an expired deadline.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    operation: &'static str,
    map_error: fn(E) -> Error,
    fut: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(map_error),
        Err(_) => {
            warn!(operation, timeout = ?limit, "repository call timed out");
            Err(Error::timeout(format!(
                "{operation} did not complete within {}ms",
                limit.as_millis()
            )))
        }
    }
}

/// Look up the stored role for a session user.
pub(crate) async fn resolve_actor<P>(
    profiles: &P,
    user_id: &UserId,
    limit: Duration,
) -> Result<Actor, Error>
where
    P: ProfileRepository + ?Sized,
{
    let profile = bounded(
        limit,
        "profile lookup",
        map_profile_repository_error,
        profiles.find_by_id(user_id),
    )
    .await?;
    profile
        .map(|profile| profile.actor())
        .ok_or_else(|| Error::permission_denied("no marketplace profile exists for this session"))
}

/// Deliver committed lifecycle events one after another. Failures are logged,
/// never returned.
async fn deliver<N>(notifier: Arc<N>, limit: Duration, events: Vec<LifecycleEvent>)
where
    N: LifecycleNotifier + ?Sized,
{
    for event in events {
        let commission_id = event.commission_id();
        let kind = event.kind();
        match tokio::time::timeout(limit, notifier.notify(&event)).await {
            Ok(Ok(())) => info!(%commission_id, event = kind, "lifecycle event delivered"),
            Ok(Err(err)) => {
                warn!(%commission_id, event = kind, error = %err, "lifecycle event not delivered");
            }
            Err(_) => warn!(
                %commission_id,
                event = kind,
                timeout = ?limit,
                "lifecycle event delivery timed out"
            ),
        }
    }
}

/// Hand committed lifecycle events to a background task.
///
/// The caller's response does not wait for the webhook, and a dropped request
/// cannot cancel delivery. The ambient trace id follows the task.
pub(crate) fn announce<N>(
    notifier: Arc<N>,
    limit: Duration,
    events: Vec<LifecycleEvent>,
) -> JoinHandle<()>
where
    N: LifecycleNotifier + ?Sized + 'static,
{
    let delivery = deliver(notifier, limit, events);
    match TraceId::current() {
        Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, delivery)),
        None => tokio::spawn(delivery),
    }
}
