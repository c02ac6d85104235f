//! Domain primitives, the lifecycle engine and the marketplace services.
//!
//! Purpose: define the strongly typed commission marketplace model and the
//! use-cases inbound adapters drive through [`ports`]. Nothing here knows
//! about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Profile / Actor / Role: identity and role store model.
//! - Commission / Bid: registry and ledger entities.
//! - `plan_transition` / `settle_bids`: the lifecycle engine.
//! - `ProfileService`, `CommissionService`, `BidService`: driving port
//!   implementations.

pub mod commissions;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod trace_id;
pub mod user;

mod bid_service;
mod commission_locks;
mod commission_service;
mod marketplace_context;
mod profile_service;
mod service_support;
#[cfg(test)]
mod service_test_helpers;

pub use self::bid_service::BidService;
pub use self::commission_locks::CommissionLocks;
pub use self::commission_service::CommissionService;
pub use self::commissions::{
    Bid, BidAmount, BidMessage, BidStatus, BidTerms, BidValidationError, Budget, CATEGORY_MAX,
    Category, Commission, CommissionCursorKey, CommissionDetails, CommissionDetailsDraft,
    CommissionDraft, CommissionFilter, CommissionScope, CommissionStatus,
    CommissionValidationError, Consent, DESCRIPTION_MAX, EstimatedDays, MESSAGE_MAX,
    ParseStatusError, SUGGESTED_CATEGORIES, StatusCounts, TITLE_MAX, sort_for_review,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lifecycle::{
    BidSettlement, LifecycleError, TransitionOutcome, is_legal_edge, plan_transition,
    reject_pending_bids, settle_bids,
};
pub use self::marketplace_context::MarketplaceContext;
pub use self::profile_service::ProfileService;
pub use self::service_support::{
    DEFAULT_NOTIFIER_TIMEOUT, DEFAULT_OPERATION_TIMEOUT, ServiceTimeouts,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Actor, BIO_MAX, Bio, DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, Profile, Role, UserId,
    UserValidationError,
};
