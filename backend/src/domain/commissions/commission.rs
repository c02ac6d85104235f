//! Commission entity and its editable details.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::CommissionStatus;
use crate::domain::UserId;

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 120;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX: usize = 5000;
/// Maximum category length in characters.
pub const CATEGORY_MAX: usize = 64;

/// Categories offered to customers when posting a commission.
///
/// Categories are an open set; these only seed the picker.
pub const SUGGESTED_CATEGORIES: [&str; 9] = [
    "Anime/Manga",
    "Fantasy Art",
    "Portrait",
    "Logo Design",
    "Character Design",
    "Concept Art",
    "Digital Painting",
    "Illustration",
    "Other",
];

/// Validation errors raised by commission constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommissionValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyDescription,
    DescriptionTooLong { max: usize },
    CategoryTooLong { max: usize },
    NegativeBudget { field: &'static str, value: i64 },
    BudgetRangeInverted { min: u64, max: u64 },
    DeadlineInPast { deadline: NaiveDate, earliest: NaiveDate },
    ArtistBeforeAssignment,
    MissingArtist { status: CommissionStatus },
    UnexpectedConsent { status: CommissionStatus },
}

impl CommissionValidationError {
    /// Wire field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => Some("title"),
            Self::EmptyDescription | Self::DescriptionTooLong { .. } => Some("description"),
            Self::CategoryTooLong { .. } => Some("category"),
            Self::NegativeBudget { field, .. } => Some(field),
            Self::BudgetRangeInverted { .. } => Some("budgetMin"),
            Self::DeadlineInPast { .. } => Some("deadline"),
            Self::ArtistBeforeAssignment
            | Self::MissingArtist { .. }
            | Self::UnexpectedConsent { .. } => None,
        }
    }
}

impl fmt::Display for CommissionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::CategoryTooLong { max } => {
                write!(f, "category must be at most {max} characters")
            }
            Self::NegativeBudget { field, value } => {
                write!(f, "{field} must be a non-negative amount (got {value})")
            }
            Self::BudgetRangeInverted { min, max } => {
                write!(f, "budget minimum {min} must not exceed maximum {max}")
            }
            Self::DeadlineInPast { deadline, earliest } => {
                write!(f, "deadline {deadline} must not precede {earliest}")
            }
            Self::ArtistBeforeAssignment => {
                write!(f, "an open commission cannot have an assigned artist")
            }
            Self::MissingArtist { status } => {
                write!(f, "a {status} commission requires an assigned artist")
            }
            Self::UnexpectedConsent { status } => {
                write!(f, "a {status} commission cannot hold pending consent")
            }
        }
    }
}

impl std::error::Error for CommissionValidationError {}

fn bounded_text(
    raw: &str,
    max: usize,
    empty: CommissionValidationError,
    too_long: CommissionValidationError,
) -> Result<String, CommissionValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Free-form commission category, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Normalise an optional category; blank input yields `None`.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, CommissionValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > CATEGORY_MAX {
            return Err(CommissionValidationError::CategoryTooLong { max: CATEGORY_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Whether the category is one of [`SUGGESTED_CATEGORIES`].
    pub fn is_suggested(&self) -> bool {
        SUGGESTED_CATEGORIES.contains(&self.0.as_str())
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Budget range in integer currency units (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    min: Option<u64>,
    max: Option<u64>,
}

impl Budget {
    /// Validate optional bounds supplied by a client or storage row.
    ///
    /// # Examples
    /// ```
    /// use commission_backend::domain::Budget;
    ///
    /// let budget = Budget::new(Some(5_000), Some(20_000)).expect("ordered range");
    /// assert_eq!(budget.min(), Some(5_000));
    /// assert!(Budget::new(Some(3), Some(2)).is_err());
    /// ```
    pub fn new(min: Option<i64>, max: Option<i64>) -> Result<Self, CommissionValidationError> {
        let min = min.map(|value| non_negative("budgetMin", value)).transpose()?;
        let max = max.map(|value| non_negative("budgetMax", value)).transpose()?;
        if let (Some(low), Some(high)) = (min, max)
            && low > high
        {
            return Err(CommissionValidationError::BudgetRangeInverted {
                min: low,
                max: high,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Option<u64> {
        self.min
    }

    pub fn max(&self) -> Option<u64> {
        self.max
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, CommissionValidationError> {
    u64::try_from(value).map_err(|_| CommissionValidationError::NegativeBudget { field, value })
}

/// Customer-editable commission content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionDetails {
    title: String,
    description: String,
    category: Option<Category>,
    budget: Budget,
    deadline: Option<NaiveDate>,
}

/// Unvalidated commission content, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommissionDetailsDraft {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub deadline: Option<NaiveDate>,
}

impl CommissionDetails {
    /// Validate a draft. Deadlines are checked against `earliest`, which is
    /// the creation date of the commission.
    pub fn new(
        draft: CommissionDetailsDraft,
        earliest: NaiveDate,
    ) -> Result<Self, CommissionValidationError> {
        let title = bounded_text(
            &draft.title,
            TITLE_MAX,
            CommissionValidationError::EmptyTitle,
            CommissionValidationError::TitleTooLong { max: TITLE_MAX },
        )?;
        let description = bounded_text(
            &draft.description,
            DESCRIPTION_MAX,
            CommissionValidationError::EmptyDescription,
            CommissionValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            },
        )?;
        let category = Category::parse(draft.category.as_deref())?;
        let budget = Budget::new(draft.budget_min, draft.budget_max)?;
        if let Some(deadline) = draft.deadline
            && deadline < earliest
        {
            return Err(CommissionValidationError::DeadlineInPast { deadline, earliest });
        }
        Ok(Self {
            title,
            description,
            category,
            budget,
            deadline: draft.deadline,
        })
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    /// Convert back into a draft so partial edits can be layered on top.
    pub fn to_draft(&self) -> CommissionDetailsDraft {
        CommissionDetailsDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.as_ref().map(|c| c.as_ref().to_owned()),
            budget_min: self.budget.min.and_then(|v| i64::try_from(v).ok()),
            budget_max: self.budget.max.and_then(|v| i64::try_from(v).ok()),
            deadline: self.deadline,
        }
    }
}

/// Recorded halves of a two-party handshake.
///
/// While a commission is `assigned` the flags count towards a mutual cancel;
/// while it is `in_progress` they count towards completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    pub customer: bool,
    pub artist: bool,
}

impl Consent {
    pub const fn none() -> Self {
        Self {
            customer: false,
            artist: false,
        }
    }

    pub const fn is_empty(self) -> bool {
        !self.customer && !self.artist
    }
}

/// Input for rebuilding a commission from storage.
#[derive(Debug, Clone)]
pub struct CommissionDraft {
    pub id: Uuid,
    pub customer_id: UserId,
    pub artist_id: Option<UserId>,
    pub details: CommissionDetails,
    pub status: CommissionStatus,
    pub consent: Consent,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
}

/// A requested artwork job posted by a customer.
///
/// ## Invariants
/// - `artist_id` is absent while `open` and present once assigned.
/// - Consent flags are only held while `assigned` or `in_progress`.
/// - `revision` grows by one with every committed mutation.
///
/// Status only changes through the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commission {
    id: Uuid,
    customer_id: UserId,
    artist_id: Option<UserId>,
    details: CommissionDetails,
    status: CommissionStatus,
    consent: Consent,
    revision: u32,
    created_at: DateTime<Utc>,
}

impl Commission {
    /// Post a new commission in the `open` state.
    pub fn open(
        id: Uuid,
        customer_id: UserId,
        details: CommissionDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            artist_id: None,
            details,
            status: CommissionStatus::Open,
            consent: Consent::none(),
            revision: 0,
            created_at,
        }
    }

    /// Rebuild a commission, checking the cross-field invariants.
    pub fn new(draft: CommissionDraft) -> Result<Self, CommissionValidationError> {
        let CommissionDraft {
            id,
            customer_id,
            artist_id,
            details,
            status,
            consent,
            revision,
            created_at,
        } = draft;

        if status == CommissionStatus::Open && artist_id.is_some() {
            return Err(CommissionValidationError::ArtistBeforeAssignment);
        }
        if status.requires_artist() && artist_id.is_none() {
            return Err(CommissionValidationError::MissingArtist { status });
        }
        let holds_consent = matches!(
            status,
            CommissionStatus::Assigned | CommissionStatus::InProgress
        );
        if !holds_consent && !consent.is_empty() {
            return Err(CommissionValidationError::UnexpectedConsent { status });
        }

        Ok(Self {
            id,
            customer_id,
            artist_id,
            details,
            status,
            consent,
            revision,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The customer who posted the commission.
    pub fn customer_id(&self) -> &UserId {
        &self.customer_id
    }

    /// The artist whose bid was accepted; `None` while the commission is open.
    pub fn artist_id(&self) -> Option<&UserId> {
        self.artist_id.as_ref()
    }

    pub fn details(&self) -> &CommissionDetails {
        &self.details
    }

    /// Current lifecycle status.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, Utc};
    /// use commission_backend::domain::{
    ///     Commission, CommissionDetails, CommissionDetailsDraft, CommissionStatus, UserId,
    /// };
    /// use uuid::Uuid;
    ///
    /// let details = CommissionDetails::new(
    ///     CommissionDetailsDraft {
    ///         title: "Badge art".to_owned(),
    ///         description: "Round badge, flat colours".to_owned(),
    ///         ..CommissionDetailsDraft::default()
    ///     },
    ///     NaiveDate::MIN,
    /// )
    /// .expect("valid details");
    /// let commission = Commission::open(Uuid::new_v4(), UserId::random(), details, Utc::now());
    ///
    /// assert_eq!(commission.status(), CommissionStatus::Open);
    /// assert_eq!(commission.artist_id(), None);
    /// assert_eq!(commission.revision(), 0);
    /// ```
    pub fn status(&self) -> CommissionStatus {
        self.status
    }

    /// Pending two-party consent for the next handshake edge.
    pub fn consent(&self) -> Consent {
        self.consent
    }

    /// Optimistic-concurrency counter, bumped by every persisted change.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `user_id` is the owning customer.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.customer_id == user_id
    }

    /// Whether `user_id` is the assigned artist.
    pub fn is_assigned_to(&self, user_id: &UserId) -> bool {
        self.artist_id.as_ref() == Some(user_id)
    }

    pub(in crate::domain) fn with_details(self, details: CommissionDetails) -> Self {
        Self { details, ..self }.bumped()
    }

    pub(in crate::domain) fn with_status(
        self,
        status: CommissionStatus,
        artist_id: Option<UserId>,
    ) -> Self {
        Self {
            status,
            artist_id: artist_id.or(self.artist_id),
            consent: Consent::none(),
            ..self
        }
        .bumped()
    }

    pub(in crate::domain) fn with_consent(self, consent: Consent) -> Self {
        Self { consent, ..self }.bumped()
    }

    fn bumped(mut self) -> Self {
        self.revision = self.revision.saturating_add(1);
        self
    }
}
