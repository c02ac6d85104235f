//! Bid ledger entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::BidStatus;
use crate::domain::UserId;

/// Maximum bid message length in characters.
pub const MESSAGE_MAX: usize = 2000;

/// Validation errors raised by bid constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidValidationError {
    NonPositiveAmount { value: i64 },
    NonPositiveEstimate { value: i64 },
    MessageTooLong { max: usize },
}

impl BidValidationError {
    /// Wire field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount { .. } => "amount",
            Self::NonPositiveEstimate { .. } => "estimatedDays",
            Self::MessageTooLong { .. } => "message",
        }
    }
}

impl fmt::Display for BidValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount { value } => {
                write!(f, "bid amount must be a positive whole number (got {value})")
            }
            Self::NonPositiveEstimate { value } => {
                write!(f, "estimated days must be a positive whole number (got {value})")
            }
            Self::MessageTooLong { max } => write!(f, "message must be at most {max} characters"),
        }
    }
}

impl std::error::Error for BidValidationError {}

/// Positive bid amount in integer currency units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BidAmount(u64);

impl BidAmount {
    pub fn new(value: i64) -> Result<Self, BidValidationError> {
        u64::try_from(value)
            .ok()
            .filter(|amount| *amount > 0)
            .map(Self)
            .ok_or(BidValidationError::NonPositiveAmount { value })
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Positive estimated delivery time in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedDays(u32);

impl EstimatedDays {
    pub fn new(value: i64) -> Result<Self, BidValidationError> {
        u32::try_from(value)
            .ok()
            .filter(|days| *days > 0)
            .map(Self)
            .ok_or(BidValidationError::NonPositiveEstimate { value })
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Optional note attached to a bid, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidMessage(String);

impl BidMessage {
    /// Normalise an optional message; blank input yields `None`.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, BidValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > MESSAGE_MAX {
            return Err(BidValidationError::MessageTooLong { max: MESSAGE_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for BidMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated offer terms supplied by an artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidTerms {
    pub amount: BidAmount,
    pub estimated_days: Option<EstimatedDays>,
    pub message: Option<BidMessage>,
}

impl BidTerms {
    /// Validate raw offer terms.
    ///
    /// # Examples
    /// ```
    /// use commission_backend::domain::BidTerms;
    ///
    /// let terms = BidTerms::new(6_000, Some(14), Some("  happy to help ")).expect("valid");
    /// assert_eq!(terms.amount.get(), 6_000);
    /// assert!(BidTerms::new(0, None, None).is_err());
    /// ```
    pub fn new(
        amount: i64,
        estimated_days: Option<i64>,
        message: Option<&str>,
    ) -> Result<Self, BidValidationError> {
        Ok(Self {
            amount: BidAmount::new(amount)?,
            estimated_days: estimated_days.map(EstimatedDays::new).transpose()?,
            message: BidMessage::parse(message)?,
        })
    }
}

/// An artist's offer against an open commission.
///
/// Only the lifecycle engine moves a bid out of `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bid {
    id: Uuid,
    commission_id: Uuid,
    artist_id: UserId,
    terms: BidTerms,
    status: BidStatus,
    created_at: DateTime<Utc>,
}

impl Bid {
    /// Place a new pending bid.
    pub fn pending(
        id: Uuid,
        commission_id: Uuid,
        artist_id: UserId,
        terms: BidTerms,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            commission_id,
            artist_id,
            terms,
            status: BidStatus::Pending,
            created_at,
        }
    }

    /// Rebuild a bid read from storage.
    pub fn restore(
        id: Uuid,
        commission_id: Uuid,
        artist_id: UserId,
        terms: BidTerms,
        status: BidStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            commission_id,
            artist_id,
            terms,
            status,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn commission_id(&self) -> Uuid {
        self.commission_id
    }

    pub fn artist_id(&self) -> &UserId {
        &self.artist_id
    }

    pub fn terms(&self) -> &BidTerms {
        &self.terms
    }

    pub fn amount(&self) -> BidAmount {
        self.terms.amount
    }

    pub fn status(&self) -> BidStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(in crate::domain) fn with_status(self, status: BidStatus) -> Self {
        Self { status, ..self }
    }
}

/// Order bids best offer first: amount ascending, then earliest placed.
pub fn sort_for_review(bids: &mut [Bid]) {
    bids.sort_by(|left, right| {
        left.amount()
            .cmp(&right.amount())
            .then_with(|| left.created_at.cmp(&right.created_at))
            .then_with(|| left.id.cmp(&right.id))
    });
}
