//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::{
    BidService, CommissionLocks, CommissionService, MarketplaceContext, ProfileService,
    ServiceTimeouts,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryMarketplace;
use crate::outbound::notifier::LoggingLifecycleNotifier;

/// Session middleware with a fresh key and the `Secure` flag off, so plain
/// HTTP test requests keep their cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Real services over one in-memory store.
pub fn in_memory_state(clock: Arc<dyn Clock>) -> HttpState {
    let store = Arc::new(InMemoryMarketplace::new());
    let timeouts = ServiceTimeouts::default();
    let context = MarketplaceContext::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(LoggingLifecycleNotifier),
        Arc::new(CommissionLocks::new()),
        Arc::clone(&clock),
        timeouts,
    );
    let profiles = Arc::new(ProfileService::new(store, clock, timeouts));
    let commissions = Arc::new(CommissionService::new(context.clone()));
    let bids = Arc::new(BidService::new(context));
    HttpState::new(HttpStatePorts {
        profiles: profiles.clone(),
        profiles_query: profiles,
        commissions: commissions.clone(),
        commissions_query: commissions,
        bids: bids.clone(),
        bids_query: bids,
    })
}

/// Sign up through the API and return the session cookie plus the new id.
pub async fn sign_up_as<S>(app: &S, display_name: &str, role: &str) -> (Cookie<'static>, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({ "displayName": display_name, "role": role }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "sign up failed");
    let cookie = session_cookie(&response);
    let body: Value = test::read_body_json(response).await;
    let id = body["id"].as_str().expect("profile id").to_owned();
    (cookie, id)
}

/// POST a JSON body with the session cookie; return status and JSON body.
pub async fn post_json<S>(
    app: &S,
    uri: &str,
    cookie: &Cookie<'static>,
    body: Value,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri(uri)
        .cookie(cookie.clone())
        .set_json(body)
        .to_request();
    let response = test::call_service(app, request).await;
    let status = response.status();
    (status, test::read_body_json(response).await)
}

/// GET with the session cookie; return status and JSON body.
pub async fn get_json<S>(app: &S, uri: &str, cookie: &Cookie<'static>) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::get()
        .uri(uri)
        .cookie(cookie.clone())
        .to_request();
    let response = test::call_service(app, request).await;
    let status = response.status();
    (status, test::read_body_json(response).await)
}
