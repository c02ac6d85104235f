//! OpenAPI schema definitions for domain and pagination types.
//!
//! Domain types and the shared pagination envelope stay framework-agnostic
//! and do not derive `ToSchema`. The wrappers here mirror their serialized
//! shape so the generated document matches what handlers emit.

use utoipa::ToSchema;

use crate::inbound::http::marketplace_dto::CommissionResponse;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with the current state of the resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store did not answer in time. Safe to retry.
    #[schema(rename = "timeout")]
    Timeout,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// `details.code` narrows the class, e.g. `illegal_transition`,
/// `duplicate_bid` or `role_required`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "cannot move commission from open to completed")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// Navigation links attached to a page.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageLinksSchema {
    /// The URL that produced this page.
    #[schema(rename = "self", example = "https://example.com/api/v1/commissions?limit=20")]
    self_: String,
    /// The URL of the following page, absent on the last page.
    next: Option<String>,
}

/// One page of commissions, newest first.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommissionPageSchema {
    data: Vec<CommissionResponse>,
    #[schema(example = 20)]
    limit: usize,
    /// Opaque cursor for the next page, absent on the last page.
    next_cursor: Option<String>,
    links: Option<PageLinksSchema>,
}
