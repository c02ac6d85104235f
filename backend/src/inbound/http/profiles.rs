//! Identity and profile HTTP handlers.
//!
//! ```text
//! POST  /api/v1/signup {"displayName":"Ada","role":"customer"}
//! POST  /api/v1/logout
//! GET   /api/v1/profile
//! PATCH /api/v1/profile {"bio":null}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Profile;
use crate::domain::ports::{ProfileChanges, SignUpRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, double_option, parse_role, require};

/// Sign-up body. The role cannot be changed afterwards.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    #[schema(example = "Ada Lovelace")]
    pub display_name: Option<String>,
    #[schema(example = "customer")]
    pub role: Option<String>,
    pub bio: Option<String>,
}

/// Partial profile edit. Send `"bio": null` to clear the bio.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    /// Accepted only when it matches the stored role.
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    #[schema(example = "artist")]
    pub role: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            id: value.id().to_string(),
            role: value.role().as_str().to_owned(),
            display_name: value.display_name().as_ref().to_owned(),
            bio: value.bio().map(|bio| bio.as_ref().to_owned()),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

fn parse_sign_up(body: SignUpBody) -> ApiResult<SignUpRequest> {
    let display_name = require(body.display_name, FieldName::new("displayName"))?;
    let role = require(body.role, FieldName::new("role"))?;
    Ok(SignUpRequest {
        display_name,
        role: parse_role(&role, FieldName::new("role"))?,
        bio: body.bio,
    })
}

fn parse_patch(body: ProfilePatch) -> ApiResult<ProfileChanges> {
    Ok(ProfileChanges {
        display_name: body.display_name,
        bio: body.bio,
        role: body
            .role
            .map(|role| parse_role(&role, FieldName::new("role")))
            .transpose()?,
    })
}

/// Create a profile and start a session for it.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "signUp",
    security([])
)]
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_sign_up(payload.into_inner())?;
    let profile = state.profiles.sign_up(request).await?;
    session.persist_user(profile.id())?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["profiles"],
    operation_id = "signOut"
)]
#[post("/logout")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No profile for this session", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let profile = state.profiles_query.get_profile(&user_id).await?;
    Ok(web::Json(profile.into()))
}

/// Edit the caller's display name or bio.
#[utoipa::path(
    patch,
    path = "/api/v1/profile",
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request or role change", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No profile for this session", body = ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "updateProfile"
)]
#[patch("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfilePatch>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let changes = parse_patch(payload.into_inner())?;
    let profile = state.profiles.update_profile(&user_id, changes).await?;
    Ok(web::Json(profile.into()))
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
