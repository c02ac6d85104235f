//! Commission registry services.
//!
//! Writes to one commission run under its in-process lock and commit with a
//! revision check, so a concurrent writer in another process loses cleanly.

use async_trait::async_trait;
use pagination::{Cursor, Page, PageRequest};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::marketplace_context::MarketplaceContext;
use crate::domain::ports::{
    CommissionChanges, CommissionCommand, CommissionCommit, CommissionQuery, CommissionRepository,
    Dashboard, LifecycleEvent, LifecycleNotifier, ListCommissionsRequest, ProfileRepository,
    TransitionKind, TransitionResponse,
};
use crate::domain::service_support::{bounded, invalid_field, map_commission_repository_error};
use crate::domain::{
    Actor, Commission, CommissionCursorKey, CommissionDetails, CommissionDetailsDraft,
    CommissionFilter, CommissionScope, CommissionStatus, Error, Role, TransitionOutcome, UserId,
    plan_transition, reject_pending_bids,
};

/// Service implementing the commission driving ports.
pub struct CommissionService<R, P, N> {
    context: MarketplaceContext<R, P, N>,
}

impl<R, P, N> Clone for CommissionService<R, P, N> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<R, P, N> CommissionService<R, P, N> {
    pub fn new(context: MarketplaceContext<R, P, N>) -> Self {
        Self { context }
    }
}

fn listing_scope(actor: &Actor, request: &ListCommissionsRequest) -> Result<CommissionScope, Error> {
    let me = &actor.user_id;
    let foreign = |other: &Option<UserId>| other.as_ref().is_some_and(|id| id != me);
    match actor.role {
        Role::Customer => {
            if request.artist_id.is_some() || foreign(&request.customer_id) {
                return Err(Error::permission_denied(
                    "customers may only list their own commissions",
                ));
            }
            Ok(CommissionScope::Customer(me.clone()))
        }
        Role::Artist => {
            if request.customer_id.is_some() || foreign(&request.artist_id) {
                return Err(Error::permission_denied(
                    "artists may only list open commissions or their own assignments",
                ));
            }
            Ok(match request.artist_id {
                Some(_) => CommissionScope::Artist(me.clone()),
                None => CommissionScope::ArtistWorkspace(me.clone()),
            })
        }
    }
}

fn dashboard_scope(actor: &Actor) -> CommissionScope {
    match actor.role {
        Role::Customer => CommissionScope::Customer(actor.user_id.clone()),
        Role::Artist => CommissionScope::ArtistWorkspace(actor.user_id.clone()),
    }
}

fn decode_cursor(raw: Option<&str>) -> Result<Option<CommissionCursorKey>, Error> {
    raw.map(|value| {
        Cursor::<CommissionCursorKey>::decode(value)
            .map(Cursor::into_key)
            .map_err(|err| invalid_field(Some("cursor"), err))
    })
    .transpose()
}

impl<R, P, N> CommissionService<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    async fn page(
        &self,
        filter: CommissionFilter,
        cursor: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Commission>, Error> {
        let after = decode_cursor(cursor)?;
        let rows = bounded(
            self.context.timeouts.repository,
            "commission listing",
            map_commission_repository_error,
            self.context
                .commissions
                .list_commissions(&filter, after, page.probe_limit()),
        )
        .await?;
        Page::from_probe(rows, page, CommissionCursorKey::of)
            .map_err(|err| Error::internal(format!("failed to encode listing cursor: {err}")))
    }

    /// Load a commission the actor owns, hiding ones they cannot see.
    async fn owned_commission(&self, actor: &Actor, id: Uuid) -> Result<Commission, Error> {
        let commission = self.context.visible_commission(actor, id).await?;
        if !commission.is_owned_by(&actor.user_id) {
            return Err(Error::permission_denied(
                "only the owning customer may edit this commission",
            ));
        }
        Ok(commission)
    }
}

#[async_trait]
impl<R, P, N> CommissionCommand for CommissionService<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    async fn create_commission(
        &self,
        user_id: &UserId,
        draft: CommissionDetailsDraft,
    ) -> Result<Commission, Error> {
        let actor = self.context.actor(user_id).await?;
        if actor.role != Role::Customer {
            return Err(Error::role_required(Role::Customer));
        }
        let now = self.context.clock.utc();
        let details = CommissionDetails::new(draft, now.date_naive())
            .map_err(|err| invalid_field(err.field(), err))?;
        let commission = Commission::open(Uuid::new_v4(), actor.user_id, details, now);

        bounded(
            self.context.timeouts.repository,
            "commission insert",
            map_commission_repository_error,
            self.context.commissions.insert_commission(&commission),
        )
        .await?;
        info!(
            commission_id = %commission.id(),
            customer_id = %commission.customer_id(),
            "commission posted"
        );
        Ok(commission)
    }

    async fn revise_commission(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
        changes: CommissionChanges,
    ) -> Result<Commission, Error> {
        let actor = self.context.actor(user_id).await?;
        let _guard = self.context.locks.acquire(commission_id).await;
        let current = self.owned_commission(&actor, commission_id).await?;
        if current.status() != CommissionStatus::Open {
            return Err(Error::invalid_state(format!(
                "commission {commission_id} is {} and can no longer be edited",
                current.status()
            )));
        }
        if changes.is_empty() {
            return Ok(current);
        }

        // A new deadline must not precede today; an untouched one keeps its
        // original bound.
        let earliest = if changes.deadline.is_some() {
            self.context.clock.utc().date_naive()
        } else {
            current.created_at().date_naive()
        };
        let draft = changes.apply(current.details().to_draft());
        let details = CommissionDetails::new(draft, earliest)
            .map_err(|err| invalid_field(err.field(), err))?;
        let commit = CommissionCommit {
            expected_revision: current.revision(),
            commission: current.with_details(details),
            bids: Vec::new(),
        };
        self.context.commit(&commit).await?;
        debug!(%commission_id, revision = commit.commission.revision(), "commission revised");
        Ok(commit.commission)
    }

    async fn transition(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
        to: CommissionStatus,
    ) -> Result<TransitionResponse, Error> {
        let actor = self.context.actor(user_id).await?;
        let guard = self.context.locks.acquire(commission_id).await;
        let current = self.context.visible_commission(&actor, commission_id).await?;
        let from = current.status();

        let (kind, next) = match plan_transition(&current, to, &actor)? {
            TransitionOutcome::Unchanged(commission) => {
                return Ok(TransitionResponse {
                    commission,
                    kind: TransitionKind::Unchanged,
                });
            }
            TransitionOutcome::ConsentRecorded(next) => (TransitionKind::ConsentRecorded, next),
            TransitionOutcome::Applied(next) => (TransitionKind::Applied, next),
        };
        let bids = if kind == TransitionKind::Applied && from == CommissionStatus::Open {
            reject_pending_bids(self.context.bids(commission_id).await?)
        } else {
            Vec::new()
        };
        let commit = CommissionCommit {
            commission: next,
            expected_revision: current.revision(),
            bids,
        };
        self.context.commit(&commit).await?;
        drop(guard);

        if kind == TransitionKind::Applied {
            info!(
                %commission_id,
                %from,
                %to,
                rejected_bids = commit.bids.len(),
                "commission status changed"
            );
            let _delivery = self.context.announce(vec![LifecycleEvent::StatusChanged {
                commission_id,
                from,
                to,
            }]);
        } else {
            info!(%commission_id, %to, user_id = %actor.user_id, "transition consent recorded");
        }
        Ok(TransitionResponse {
            commission: commit.commission,
            kind,
        })
    }
}

#[async_trait]
impl<R, P, N> CommissionQuery for CommissionService<R, P, N>
where
    R: CommissionRepository,
    P: ProfileRepository,
    N: LifecycleNotifier + 'static,
{
    async fn get_commission(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
    ) -> Result<Commission, Error> {
        let actor = self.context.actor(user_id).await?;
        self.context.visible_commission(&actor, commission_id).await
    }

    async fn list_commissions(
        &self,
        user_id: &UserId,
        request: ListCommissionsRequest,
    ) -> Result<Page<Commission>, Error> {
        let actor = self.context.actor(user_id).await?;
        let scope = listing_scope(&actor, &request)?;
        let filter = CommissionFilter {
            scope,
            status: request.status,
        };
        self.page(filter, request.cursor.as_deref(), request.page).await
    }

    async fn dashboard(
        &self,
        user_id: &UserId,
        cursor: Option<String>,
        page: PageRequest,
    ) -> Result<Dashboard, Error> {
        let actor = self.context.actor(user_id).await?;
        let scope = dashboard_scope(&actor);
        let counts = bounded(
            self.context.timeouts.repository,
            "status counts",
            map_commission_repository_error,
            self.context.commissions.status_counts(&scope),
        )
        .await?;
        let commissions = self
            .page(
                CommissionFilter {
                    scope,
                    status: None,
                },
                cursor.as_deref(),
                page,
            )
            .await?;
        Ok(Dashboard {
            role: actor.role,
            commissions,
            counts,
        })
    }
}

#[cfg(test)]
#[path = "commission_service_tests.rs"]
mod tests;
