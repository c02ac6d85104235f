//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint of the commission marketplace,
//! the request and response DTOs, and the schema wrappers for domain errors
//! and the page envelope. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::bids::{AcceptBidResult, SubmitBidBody};
use crate::inbound::http::commissions::{
    CommissionPatch, CreateCommissionBody, DashboardResponse, StatusCountsResponse,
    TransitionBody, TransitionResult,
};
use crate::inbound::http::marketplace_dto::{BidResponse, CommissionResponse, ConsentResponse};
use crate::inbound::http::profiles::{ProfilePatch, ProfileResponse, SignUpBody};
use crate::inbound::http::schemas::{
    CommissionPageSchema, ErrorCodeSchema, ErrorSchema, PageLinksSchema,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Commission marketplace API",
        description = "Commission lifecycle, bidding and profile endpoints.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::profiles::sign_up,
        crate::inbound::http::profiles::sign_out,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::update_profile,
        crate::inbound::http::commissions::create_commission,
        crate::inbound::http::commissions::list_commissions,
        crate::inbound::http::commissions::get_commission,
        crate::inbound::http::commissions::revise_commission,
        crate::inbound::http::commissions::transition_commission,
        crate::inbound::http::commissions::dashboard,
        crate::inbound::http::bids::submit_bid,
        crate::inbound::http::bids::list_bids,
        crate::inbound::http::bids::accept_bid,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CommissionPageSchema,
        PageLinksSchema,
        SignUpBody,
        ProfilePatch,
        ProfileResponse,
        CreateCommissionBody,
        CommissionPatch,
        TransitionBody,
        TransitionResult,
        StatusCountsResponse,
        DashboardResponse,
        CommissionResponse,
        ConsentResponse,
        SubmitBidBody,
        BidResponse,
        AcceptBidResult,
    )),
    tags(
        (name = "profiles", description = "Sign-up, sessions and profiles"),
        (name = "commissions", description = "Commission registry and lifecycle"),
        (name = "bids", description = "Bid ledger and acceptance"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
