//! Commission lifecycle engine.
//!
//! The engine is the only writer of [`CommissionStatus`]. It is pure: callers
//! hand it the current commission and the requested change, and it returns
//! the next commission value or the reason the change is refused. Services
//! persist the result under a revision check.
//!
//! | from        | to          | actor                                  |
//! |-------------|-------------|----------------------------------------|
//! | open        | assigned    | bid acceptance only                    |
//! | open        | cancelled   | owning customer                        |
//! | assigned    | in_progress | assigned artist                        |
//! | assigned    | cancelled   | both parties (mutual cancel)           |
//! | in_progress | completed   | both parties (dual confirmation)       |

use serde_json::json;

use crate::domain::{
    Actor, Bid, BidStatus, Commission, CommissionStatus, Consent, Error, Role, UserId,
};

/// Reasons the engine refuses a change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The edge is absent from the transition table.
    #[error("cannot move a commission from {from} to {to}")]
    IllegalTransition {
        /// Status the commission holds.
        from: CommissionStatus,
        /// Status the caller asked for.
        to: CommissionStatus,
    },
    /// The edge exists but the actor may not take it.
    #[error("{reason}")]
    PermissionDenied {
        /// Client-facing explanation.
        reason: String,
    },
    /// The commission is not in the state the operation needs.
    #[error("{reason}")]
    InvalidState {
        /// Client-facing explanation.
        reason: String,
    },
}

impl LifecycleError {
    fn denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }
}

impl From<LifecycleError> for Error {
    fn from(value: LifecycleError) -> Self {
        let message = value.to_string();
        match value {
            LifecycleError::IllegalTransition { from, to } => {
                Error::conflict(message).with_details(json!({
                    "code": "illegal_transition",
                    "from": from,
                    "to": to,
                }))
            }
            LifecycleError::PermissionDenied { reason } => Error::permission_denied(reason),
            LifecycleError::InvalidState { reason } => Error::invalid_state(reason),
        }
    }
}

/// Result of a transition request that the engine accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status moved.
    Applied(Commission),
    /// One half of a two-party handshake was recorded; the status is unchanged.
    ConsentRecorded(Commission),
    /// The same party repeated a recorded consent. Nothing to persist.
    Unchanged(Commission),
}

impl TransitionOutcome {
    /// The commission value to persist or return, whichever variant this is.
    pub fn commission(&self) -> &Commission {
        match self {
            Self::Applied(c) | Self::ConsentRecorded(c) | Self::Unchanged(c) => c,
        }
    }

    /// Consume the outcome, keeping the commission.
    pub fn into_commission(self) -> Commission {
        match self {
            Self::Applied(c) | Self::ConsentRecorded(c) | Self::Unchanged(c) => c,
        }
    }
}

/// Which side of a commission an actor stands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Customer,
    Artist,
}

fn party_of(commission: &Commission, actor: &Actor) -> Option<Party> {
    match actor.role {
        Role::Customer if commission.is_owned_by(&actor.user_id) => Some(Party::Customer),
        Role::Artist if commission.is_assigned_to(&actor.user_id) => Some(Party::Artist),
        _ => None,
    }
}

/// Whether the transition table contains `from → to`.
pub const fn is_legal_edge(from: CommissionStatus, to: CommissionStatus) -> bool {
    use CommissionStatus::{Assigned, Cancelled, Completed, InProgress, Open};
    matches!(
        (from, to),
        (Open, Assigned)
            | (Open, Cancelled)
            | (Assigned, InProgress)
            | (Assigned, Cancelled)
            | (InProgress, Completed)
    )
}

/// Decide a user-requested status change.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, Utc};
/// use commission_backend::domain::{
///     Actor, Commission, CommissionDetails, CommissionDetailsDraft, CommissionStatus,
///     LifecycleError, UserId, plan_transition,
/// };
/// use uuid::Uuid;
///
/// let customer = UserId::random();
/// let details = CommissionDetails::new(
///     CommissionDetailsDraft {
///         title: "Logo".to_owned(),
///         description: "A fox mark".to_owned(),
///         ..CommissionDetailsDraft::default()
///     },
///     NaiveDate::MIN,
/// )
/// .expect("valid details");
/// let commission = Commission::open(Uuid::new_v4(), customer.clone(), details, Utc::now());
///
/// let err = plan_transition(&commission, CommissionStatus::Completed, &Actor::customer(customer))
///     .expect_err("open commissions cannot complete");
/// assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
/// ```
pub fn plan_transition(
    commission: &Commission,
    to: CommissionStatus,
    actor: &Actor,
) -> Result<TransitionOutcome, LifecycleError> {
    let from = commission.status();
    if !is_legal_edge(from, to) {
        return Err(LifecycleError::IllegalTransition { from, to });
    }
    let party = party_of(commission, actor);

    match (from, to) {
        (CommissionStatus::Open, CommissionStatus::Assigned) => Err(LifecycleError::denied(
            "commissions are assigned only by accepting a bid",
        )),
        (CommissionStatus::Open, CommissionStatus::Cancelled) => match party {
            Some(Party::Customer) => Ok(TransitionOutcome::Applied(
                commission.clone().with_status(to, None),
            )),
            _ => Err(LifecycleError::denied(
                "only the owning customer may cancel an open commission",
            )),
        },
        (CommissionStatus::Assigned, CommissionStatus::InProgress) => match party {
            Some(Party::Artist) => Ok(TransitionOutcome::Applied(
                commission.clone().with_status(to, None),
            )),
            _ => Err(LifecycleError::denied(
                "only the assigned artist may start work on a commission",
            )),
        },
        (CommissionStatus::Assigned, CommissionStatus::Cancelled)
        | (CommissionStatus::InProgress, CommissionStatus::Completed) => {
            let Some(party) = party else {
                return Err(LifecycleError::denied(format!(
                    "only the owning customer or the assigned artist may move a commission to {to}"
                )));
            };
            Ok(record_consent(commission, to, party))
        }
        _ => Err(LifecycleError::IllegalTransition { from, to }),
    }
}

fn record_consent(commission: &Commission, to: CommissionStatus, party: Party) -> TransitionOutcome {
    let current = commission.consent();
    let already = match party {
        Party::Customer => current.customer,
        Party::Artist => current.artist,
    };
    if already {
        return TransitionOutcome::Unchanged(commission.clone());
    }
    let next = match party {
        Party::Customer => Consent {
            customer: true,
            ..current
        },
        Party::Artist => Consent {
            artist: true,
            ..current
        },
    };
    if next.customer && next.artist {
        TransitionOutcome::Applied(commission.clone().with_status(to, None))
    } else {
        TransitionOutcome::ConsentRecorded(commission.clone().with_consent(next))
    }
}

/// Settlement produced by accepting a bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidSettlement {
    /// The commission, now `assigned` to the bid's artist.
    pub commission: Commission,
    /// The accepted bid.
    pub accepted: Bid,
    /// Every other bid on the commission that moved to `rejected`.
    pub rejected: Vec<Bid>,
}

/// Apply the system `open → assigned` edge for an accepted bid.
///
/// `bids` holds every bid on the commission, including `winner`.
pub fn settle_bids(
    commission: &Commission,
    winner: &Bid,
    bids: Vec<Bid>,
) -> Result<BidSettlement, LifecycleError> {
    if commission.status() != CommissionStatus::Open {
        return Err(LifecycleError::InvalidState {
            reason: format!(
                "commission {} is {} and no longer accepts bids",
                commission.id(),
                commission.status()
            ),
        });
    }
    if winner.commission_id() != commission.id() || winner.status() != BidStatus::Pending {
        return Err(LifecycleError::InvalidState {
            reason: format!("bid {} is not a pending bid on this commission", winner.id()),
        });
    }

    let rejected = reject_pending_bids(bids.into_iter().filter(|bid| bid.id() != winner.id()));
    let artist: UserId = winner.artist_id().clone();
    Ok(BidSettlement {
        commission: commission
            .clone()
            .with_status(CommissionStatus::Assigned, Some(artist)),
        accepted: winner.clone().with_status(BidStatus::Accepted),
        rejected,
    })
}

/// Move every still-pending bid to `rejected`.
///
/// Settled bids are dropped from the result, so the returned list holds
/// exactly the rows a commit must rewrite. Used when a commission leaves
/// `open` by assignment or by cancellation.
pub fn reject_pending_bids(bids: impl IntoIterator<Item = Bid>) -> Vec<Bid> {
    bids.into_iter()
        .filter(|bid| bid.status() == BidStatus::Pending)
        .map(|bid| bid.with_status(BidStatus::Rejected))
        .collect()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
