//! Driving port for commission registry mutations and lifecycle transitions.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Commission, CommissionDetailsDraft, CommissionStatus, Error, UserId};

/// Partial edit of an open commission.
///
/// Outer `None` keeps the current value. For optional fields `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommissionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<String>>,
    pub budget_min: Option<Option<i64>>,
    pub budget_max: Option<Option<i64>>,
    pub deadline: Option<Option<NaiveDate>>,
}

impl CommissionChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer the changes over an existing draft.
    pub fn apply(self, draft: CommissionDetailsDraft) -> CommissionDetailsDraft {
        CommissionDetailsDraft {
            title: self.title.unwrap_or(draft.title),
            description: self.description.unwrap_or(draft.description),
            category: self.category.unwrap_or(draft.category),
            budget_min: self.budget_min.unwrap_or(draft.budget_min),
            budget_max: self.budget_max.unwrap_or(draft.budget_max),
            deadline: self.deadline.unwrap_or(draft.deadline),
        }
    }
}

/// How the engine handled a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// The status moved.
    Applied,
    /// The caller's consent was recorded; the other party must still agree.
    ConsentRecorded,
    /// The caller had already consented; nothing changed.
    Unchanged,
}

/// Commission state after a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResponse {
    pub commission: Commission,
    pub kind: TransitionKind,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommissionCommand: Send + Sync {
    /// Post a new commission as the session customer.
    async fn create_commission(
        &self,
        user_id: &UserId,
        draft: CommissionDetailsDraft,
    ) -> Result<Commission, Error>;

    /// Edit an open commission owned by the session customer.
    async fn revise_commission(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
        changes: CommissionChanges,
    ) -> Result<Commission, Error>;

    /// Ask the lifecycle engine to move a commission to `to`.
    async fn transition(
        &self,
        user_id: &UserId,
        commission_id: Uuid,
        to: CommissionStatus,
    ) -> Result<TransitionResponse, Error>;
}
