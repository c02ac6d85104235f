//! Commission registry and bid ledger model.
//!
//! Commissions move through `open → assigned → in_progress → completed`,
//! with `cancelled` reachable from `open` or `assigned`. Bids are placed
//! against open commissions and settled when one of them is accepted.

mod bid;
mod commission;
mod listing;
mod status;

pub use bid::{
    Bid, BidAmount, BidMessage, BidTerms, BidValidationError, EstimatedDays, MESSAGE_MAX,
    sort_for_review,
};
pub use commission::{
    Budget, CATEGORY_MAX, Category, Commission, CommissionDetails, CommissionDetailsDraft,
    CommissionDraft, CommissionValidationError, Consent, DESCRIPTION_MAX, SUGGESTED_CATEGORIES,
    TITLE_MAX,
};
pub use listing::{CommissionCursorKey, CommissionFilter, CommissionScope, StatusCounts};
pub use status::{BidStatus, CommissionStatus, ParseStatusError};
