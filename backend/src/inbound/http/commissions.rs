//! Commission registry, lifecycle and dashboard HTTP handlers.
//!
//! ```text
//! POST  /api/v1/commissions
//! GET   /api/v1/commissions?status=open&limit=20&cursor=...
//! GET   /api/v1/commissions/{id}
//! PATCH /api/v1/commissions/{id}
//! POST  /api/v1/commissions/{id}/transitions {"to":"in_progress"}
//! GET   /api/v1/dashboard
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{
    CommissionChanges, Dashboard, ListCommissionsRequest, TransitionKind, TransitionResponse,
};
use crate::domain::{Commission, CommissionDetailsDraft, StatusCounts};
use crate::inbound::http::ApiResult;
use crate::inbound::http::marketplace_dto::CommissionResponse;
use crate::inbound::http::schemas::{CommissionPageSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, double_option, page_request, parse_date, parse_status, parse_user_id, parse_uuid,
    require,
};

/// Body for posting a commission. Budgets are in cents.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommissionBody {
    #[schema(example = "Portrait of my cat")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "Portrait")]
    pub category: Option<String>,
    #[schema(example = 5000)]
    pub budget_min: Option<i64>,
    #[schema(example = 20000)]
    pub budget_max: Option<i64>,
    #[schema(example = "2026-12-24")]
    pub deadline: Option<String>,
}

/// Partial edit of an open commission. `null` clears an optional field.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub budget_min: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub budget_max: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub deadline: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBody {
    /// Target status, e.g. `in_progress`.
    #[schema(example = "in_progress")]
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResult {
    /// `applied`, `consent_recorded` or `unchanged`.
    #[schema(example = "consent_recorded")]
    pub outcome: String,
    pub commission: CommissionResponse,
}

impl From<TransitionResponse> for TransitionResult {
    fn from(value: TransitionResponse) -> Self {
        let outcome = match value.kind {
            TransitionKind::Applied => "applied",
            TransitionKind::ConsentRecorded => "consent_recorded",
            TransitionKind::Unchanged => "unchanged",
        };
        Self {
            outcome: outcome.to_owned(),
            commission: value.commission.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCommissionsParams {
    pub customer_id: Option<String>,
    pub artist_id: Option<String>,
    pub status: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountsResponse {
    pub total: u64,
    pub open: u64,
    pub assigned: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl From<StatusCounts> for StatusCountsResponse {
    fn from(value: StatusCounts) -> Self {
        Self {
            total: value.total,
            open: value.open,
            assigned: value.assigned,
            in_progress: value.in_progress,
            completed: value.completed,
            cancelled: value.cancelled,
        }
    }
}

/// Role-based feed: artists see open work and their assignments, customers
/// their own posts.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[schema(example = "artist")]
    pub role: String,
    #[schema(value_type = CommissionPageSchema)]
    pub commissions: Page<CommissionResponse>,
    pub counts: StatusCountsResponse,
}

fn optional_date(raw: Option<String>, field: FieldName) -> ApiResult<Option<chrono::NaiveDate>> {
    raw.map(|value| parse_date(&value, field)).transpose()
}

fn parse_create(body: CreateCommissionBody) -> ApiResult<CommissionDetailsDraft> {
    Ok(CommissionDetailsDraft {
        title: require(body.title, FieldName::new("title"))?,
        description: require(body.description, FieldName::new("description"))?,
        category: body.category,
        budget_min: body.budget_min,
        budget_max: body.budget_max,
        deadline: optional_date(body.deadline, FieldName::new("deadline"))?,
    })
}

fn parse_patch(body: CommissionPatch) -> ApiResult<CommissionChanges> {
    let deadline = body
        .deadline
        .map(|value| optional_date(value, FieldName::new("deadline")))
        .transpose()?;
    Ok(CommissionChanges {
        title: body.title,
        description: body.description,
        category: body.category,
        budget_min: body.budget_min,
        budget_max: body.budget_max,
        deadline,
    })
}

fn parse_list(params: ListCommissionsParams) -> ApiResult<ListCommissionsRequest> {
    Ok(ListCommissionsRequest {
        customer_id: params
            .customer_id
            .map(|id| parse_user_id(&id, FieldName::new("customerId")))
            .transpose()?,
        artist_id: params
            .artist_id
            .map(|id| parse_user_id(&id, FieldName::new("artistId")))
            .transpose()?,
        status: params
            .status
            .map(|status| parse_status(&status, FieldName::new("status")))
            .transpose()?,
        cursor: params.cursor,
        page: page_request(params.limit)?,
    })
}

pub(crate) fn commission_id(path: &str) -> ApiResult<Uuid> {
    parse_uuid(path, FieldName::new("id"))
}

fn page_response(page: Page<Commission>, request: &HttpRequest) -> Page<CommissionResponse> {
    page.map(CommissionResponse::from)
        .with_links(&request.full_url())
}

/// Post a new commission as the signed-in customer.
#[utoipa::path(
    post,
    path = "/api/v1/commissions",
    request_body = CreateCommissionBody,
    responses(
        (status = 201, description = "Commission posted", body = CommissionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only customers post commissions", body = ErrorSchema),
        (status = 504, description = "Store timed out", body = ErrorSchema)
    ),
    tags = ["commissions"],
    operation_id = "createCommission"
)]
#[post("/commissions")]
pub async fn create_commission(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCommissionBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let draft = parse_create(payload.into_inner())?;
    let commission = state
        .commissions
        .create_commission(&user_id, draft)
        .await?;
    Ok(HttpResponse::Created().json(CommissionResponse::from(commission)))
}

/// List commissions visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/commissions",
    params(ListCommissionsParams),
    responses(
        (status = 200, description = "One page of commissions", body = CommissionPageSchema),
        (status = 400, description = "Invalid filter or cursor", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Filter names another user", body = ErrorSchema)
    ),
    tags = ["commissions"],
    operation_id = "listCommissions"
)]
#[get("/commissions")]
pub async fn list_commissions(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    params: web::Query<ListCommissionsParams>,
) -> ApiResult<web::Json<Page<CommissionResponse>>> {
    let user_id = session.require_user_id()?;
    let list = parse_list(params.into_inner())?;
    let page = state
        .commissions_query
        .list_commissions(&user_id, list)
        .await?;
    Ok(web::Json(page_response(page, &request)))
}

/// Fetch one commission.
#[utoipa::path(
    get,
    path = "/api/v1/commissions/{id}",
    params(("id" = String, Path, description = "Commission id")),
    responses(
        (status = 200, description = "Commission", body = CommissionResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found or not visible", body = ErrorSchema)
    ),
    tags = ["commissions"],
    operation_id = "getCommission"
)]
#[get("/commissions/{id}")]
pub async fn get_commission(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CommissionResponse>> {
    let user_id = session.require_user_id()?;
    let id = commission_id(&path)?;
    let commission = state.commissions_query.get_commission(&user_id, id).await?;
    Ok(web::Json(commission.into()))
}

/// Edit an open commission owned by the caller.
#[utoipa::path(
    patch,
    path = "/api/v1/commissions/{id}",
    params(("id" = String, Path, description = "Commission id")),
    request_body = CommissionPatch,
    responses(
        (status = 200, description = "Revised commission", body = CommissionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Commission is no longer open", body = ErrorSchema)
    ),
    tags = ["commissions"],
    operation_id = "reviseCommission"
)]
#[patch("/commissions/{id}")]
pub async fn revise_commission(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CommissionPatch>,
) -> ApiResult<web::Json<CommissionResponse>> {
    let user_id = session.require_user_id()?;
    let id = commission_id(&path)?;
    let changes = parse_patch(payload.into_inner())?;
    let commission = state
        .commissions
        .revise_commission(&user_id, id, changes)
        .await?;
    Ok(web::Json(commission.into()))
}

/// Ask the lifecycle engine to move a commission.
///
/// Completion and mutual cancellation need both parties; the first call
/// answers `consent_recorded`.
#[utoipa::path(
    post,
    path = "/api/v1/commissions/{id}/transitions",
    params(("id" = String, Path, description = "Commission id")),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Transition handled", body = TransitionResult),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Caller may not drive this edge", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Illegal transition", body = ErrorSchema)
    ),
    tags = ["commissions"],
    operation_id = "transitionCommission"
)]
#[post("/commissions/{id}/transitions")]
pub async fn transition_commission(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TransitionBody>,
) -> ApiResult<web::Json<TransitionResult>> {
    let user_id = session.require_user_id()?;
    let id = commission_id(&path)?;
    let to = require(payload.into_inner().to, FieldName::new("to"))?;
    let to = parse_status(&to, FieldName::new("to"))?;
    let response = state.commissions.transition(&user_id, id, to).await?;
    Ok(web::Json(response.into()))
}

/// The caller's role-based feed and per-status totals.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(PageParams),
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "No profile for this session", body = ErrorSchema)
    ),
    tags = ["commissions"],
    operation_id = "getDashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    params: web::Query<PageParams>,
) -> ApiResult<web::Json<DashboardResponse>> {
    let user_id = session.require_user_id()?;
    let PageParams { cursor, limit } = params.into_inner();
    let Dashboard {
        role,
        commissions,
        counts,
    } = state
        .commissions_query
        .dashboard(&user_id, cursor, page_request(limit)?)
        .await?;
    Ok(web::Json(DashboardResponse {
        role: role.as_str().to_owned(),
        commissions: page_response(commissions, &request),
        counts: counts.into(),
    }))
}

#[cfg(test)]
#[path = "commissions_tests.rs"]
mod tests;
